//! Method registry holding one resolver table per type.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::types::{PureFn, StatefulFn};
use crate::runner::ds::function_object::{ArgumentDefinition, Function};
use crate::runner::ds::state::Stateful;
use crate::runner::ds::value::ConstructorId;
use crate::runner::std_lib::core::Builtins;
use crate::runner::std_lib::register_core_builtins;

/// Key of a resolver table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Any,
    Number,
    Integer,
    BigInteger,
    Decimal,
    Boolean,
    Text,
    Function,
    Array,
    Error,
    Atom(ConstructorId),
}

/// A type definition under construction. Methods take the receiver as
/// their first formal, named `self`.
pub struct BuiltInType {
    pub key: TypeKey,
    pub methods: HashMap<Rc<str>, Function>,
}

impl BuiltInType {
    pub fn new(key: TypeKey) -> Self {
        BuiltInType {
            key,
            methods: HashMap::new(),
        }
    }

    /// Add a method that ignores the state. `params` excludes `self`.
    pub fn add_method(self, name: &str, params: &[&str], func: PureFn) -> Self {
        let function = Function::native(name, method_args(params), move |ctx, state, args| {
            let value = func(ctx, args)?;
            Ok(Stateful::new(state, value))
        });
        self.add_function(name, function)
    }

    /// Add a method that reads or updates the state. `params` excludes `self`.
    pub fn add_stateful_method(self, name: &str, params: &[&str], func: StatefulFn) -> Self {
        let function = Function::native(name, method_args(params), move |ctx, state, args| {
            func(ctx, state, args)
        });
        self.add_function(name, function)
    }

    pub fn add_function(mut self, name: &str, function: Function) -> Self {
        self.methods.insert(Rc::from(name), function);
        self
    }
}

fn method_args(params: &[&str]) -> Vec<ArgumentDefinition> {
    let mut args = Vec::with_capacity(params.len() + 1);
    args.push(ArgumentDefinition::new("self"));
    args.extend(params.iter().map(|p| ArgumentDefinition::new(p)));
    args
}

/// All resolver tables. Every registration bumps the epoch so call-site
/// caches filled earlier are treated as stale.
pub struct MethodRegistry {
    tables: HashMap<TypeKey, HashMap<Rc<str>, Function>>,
    epoch: u64,
}

impl MethodRegistry {
    pub fn new() -> Self {
        MethodRegistry {
            tables: HashMap::new(),
            epoch: 0,
        }
    }

    /// Create a registry with the builtin library registered.
    pub fn with_core(builtins: &Builtins) -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry, builtins);
        registry
    }

    pub fn register_type(&mut self, ty: BuiltInType) {
        debug!(key = ?ty.key, methods = ty.methods.len(), "registering type");
        let table = self.tables.entry(ty.key).or_insert_with(HashMap::new);
        table.extend(ty.methods);
        self.epoch += 1;
    }

    pub fn register_method(&mut self, key: TypeKey, name: &str, function: Function) {
        debug!(key = ?key, method = name, "registering method");
        self.tables
            .entry(key)
            .or_insert_with(HashMap::new)
            .insert(Rc::from(name), function);
        self.epoch += 1;
    }

    /// Direct table lookup, no inheritance chain.
    pub fn lookup(&self, key: TypeKey, name: &str) -> Option<&Function> {
        self.tables.get(&key).and_then(|table| table.get(name))
    }

    pub fn has_method(&self, key: TypeKey, name: &str) -> bool {
        self.lookup(key, name).is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn method_names(&self, key: TypeKey) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tables
            .get(&key)
            .map(|table| table.keys().map(|k| &**k).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::value::Value;

    fn answer(
        _ctx: &mut crate::runner::plugin::types::EvalContext,
        _args: Vec<Value>,
    ) -> Result<Value, crate::runner::ds::error::RuntimeError> {
        Ok(Value::Integer(42))
    }

    #[test]
    fn test_registration_bumps_epoch() {
        let mut registry = MethodRegistry::new();
        let before = registry.epoch();
        registry.register_type(BuiltInType::new(TypeKey::Text).add_method("answer", &[], answer));
        assert!(registry.epoch() > before);
        assert!(registry.has_method(TypeKey::Text, "answer"));
        assert!(!registry.has_method(TypeKey::Any, "answer"));
    }

    #[test]
    fn test_method_formals_include_receiver() {
        let ty = BuiltInType::new(TypeKey::Integer).add_method("plus", &["that"], answer);
        let plus = ty.methods.get("plus").unwrap();
        assert_eq!(plus.arity(), 2);
        assert_eq!(&*plus.args()[0].name, "self");
    }
}
