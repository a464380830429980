//! Per-kind method resolvers.
//!
//! Each representational kind has a stateless resolver that walks a fixed
//! chain of resolver tables. The first table containing the method name wins.
//! Kinds without a resolver (sentinels, host values, proxies) are handled by
//! the dispatcher directly.

use crate::runner::ds::function_object::Function;
use crate::runner::ds::value::{ConstructorId, Value, ValueKind};
use crate::runner::plugin::registry::{MethodRegistry, TypeKey};

/// What a call-site cache is keyed on: the receiver kind plus, for atoms
/// and constructors, the constructor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub kind: ValueKind,
    pub constructor: Option<ConstructorId>,
}

impl DispatchKey {
    pub fn of(value: &Value) -> Self {
        let constructor = match value {
            Value::Atom(atom) => Some(atom.constructor().id()),
            Value::Constructor(cons) => Some(cons.id()),
            _ => None,
        };
        DispatchKey {
            kind: value.kind(),
            constructor,
        }
    }
}

pub type ResolverFn = fn(&MethodRegistry, &DispatchKey, &str) -> Option<Function>;

fn first_in_chain(registry: &MethodRegistry, chain: &[TypeKey], name: &str) -> Option<Function> {
    chain
        .iter()
        .find_map(|key| registry.lookup(*key, name))
        .cloned()
}

pub fn resolve_integer(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(
        registry,
        &[TypeKey::Integer, TypeKey::Number, TypeKey::Any],
        name,
    )
}

pub fn resolve_big_integer(
    registry: &MethodRegistry,
    _: &DispatchKey,
    name: &str,
) -> Option<Function> {
    first_in_chain(
        registry,
        &[
            TypeKey::BigInteger,
            TypeKey::Integer,
            TypeKey::Number,
            TypeKey::Any,
        ],
        name,
    )
}

pub fn resolve_decimal(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(
        registry,
        &[TypeKey::Decimal, TypeKey::Number, TypeKey::Any],
        name,
    )
}

pub fn resolve_boolean(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(registry, &[TypeKey::Boolean, TypeKey::Any], name)
}

pub fn resolve_text(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(registry, &[TypeKey::Text, TypeKey::Any], name)
}

pub fn resolve_function(
    registry: &MethodRegistry,
    _: &DispatchKey,
    name: &str,
) -> Option<Function> {
    first_in_chain(registry, &[TypeKey::Function, TypeKey::Any], name)
}

pub fn resolve_array(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(registry, &[TypeKey::Array, TypeKey::Any], name)
}

/// Atoms and constructors share their type's table.
pub fn resolve_atom(registry: &MethodRegistry, key: &DispatchKey, name: &str) -> Option<Function> {
    match key.constructor {
        Some(id) => first_in_chain(registry, &[TypeKey::Atom(id), TypeKey::Any], name),
        None => first_in_chain(registry, &[TypeKey::Any], name),
    }
}

/// Only error-handling methods. Everything else is absorbed by the caller.
pub fn resolve_error(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(registry, &[TypeKey::Error], name)
}

/// Generic operations available on every value, used as the fallback for
/// host values and proxies.
pub fn resolve_any(registry: &MethodRegistry, _: &DispatchKey, name: &str) -> Option<Function> {
    first_in_chain(registry, &[TypeKey::Any], name)
}

pub fn resolver_for(kind: ValueKind) -> Option<ResolverFn> {
    match kind {
        ValueKind::Integer => Some(resolve_integer),
        ValueKind::BigInteger => Some(resolve_big_integer),
        ValueKind::Decimal => Some(resolve_decimal),
        ValueKind::Boolean => Some(resolve_boolean),
        ValueKind::Text => Some(resolve_text),
        ValueKind::Function => Some(resolve_function),
        ValueKind::Array => Some(resolve_array),
        ValueKind::Atom | ValueKind::Constructor => Some(resolve_atom),
        ValueKind::Error => Some(resolve_error),
        ValueKind::PanicSentinel | ValueKind::Host | ValueKind::Proxy => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::plugin::types::EvalContext;

    #[test]
    fn test_integer_falls_back_to_number_and_any() {
        let ctx = EvalContext::new();
        let key = DispatchKey::of(&Value::Integer(1));
        let resolve = resolver_for(key.kind).unwrap();
        let plus = resolve(ctx.registry(), &key, "+").unwrap();
        assert!(plus.same(ctx.registry().lookup(TypeKey::Number, "+").unwrap()));
        let to_text = resolve(ctx.registry(), &key, "to_text").unwrap();
        assert!(to_text.same(ctx.registry().lookup(TypeKey::Any, "to_text").unwrap()));
    }

    #[test]
    fn test_error_resolver_ignores_any_table() {
        let ctx = EvalContext::new();
        let key = DispatchKey {
            kind: ValueKind::Error,
            constructor: None,
        };
        assert!(resolve_error(ctx.registry(), &key, "==").is_none());
        assert!(resolve_error(ctx.registry(), &key, "catch").is_some());
    }

    #[test]
    fn test_no_resolver_for_foreign_kinds() {
        assert!(resolver_for(ValueKind::Host).is_none());
        assert!(resolver_for(ValueKind::Proxy).is_none());
        assert!(resolver_for(ValueKind::PanicSentinel).is_none());
    }
}
