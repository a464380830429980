//! Core built-ins registration.
//!
//! Holds the builtin constructors the runtime itself needs and registers
//! every builtin type with the method registry.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::runner::ds::value::{AtomConstructor, BuiltinTag, Value};
use crate::runner::plugin::registry::MethodRegistry;

use super::any;
use super::array;
use super::boolean;
use super::error;
use super::function;
use super::number;
use super::state;
use super::text;

/// Builtin constructors, created once per evaluation context.
pub struct Builtins {
    nothing: Value,
    less: Value,
    equal: Value,
    greater: Value,
    state: Rc<AtomConstructor>,
}

impl Builtins {
    pub fn new() -> Self {
        Builtins {
            nothing: AtomConstructor::builtin("Nothing", &[], BuiltinTag::Nothing).singleton(),
            less: AtomConstructor::builtin("Less", &[], BuiltinTag::Less).singleton(),
            equal: AtomConstructor::builtin("Equal", &[], BuiltinTag::Equal).singleton(),
            greater: AtomConstructor::builtin("Greater", &[], BuiltinTag::Greater).singleton(),
            state: AtomConstructor::builtin("State", &[], BuiltinTag::State),
        }
    }

    pub fn nothing(&self) -> Value {
        self.nothing.clone()
    }

    pub fn ordering(&self, ordering: Ordering) -> Value {
        match ordering {
            Ordering::Less => self.less.clone(),
            Ordering::Equal => self.equal.clone(),
            Ordering::Greater => self.greater.clone(),
        }
    }

    /// The `State` type, receiver of `get` and `put`.
    pub fn state(&self) -> Value {
        Value::Constructor(self.state.clone())
    }

    pub fn state_constructor(&self) -> &Rc<AtomConstructor> {
        &self.state
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

/// Register all builtin types with the registry.
pub fn register_core_builtins(registry: &mut MethodRegistry, builtins: &Builtins) {
    any::register(registry);
    number::register(registry);
    boolean::register(registry);
    text::register(registry);
    array::register(registry);
    function::register(registry);
    error::register(registry);
    state::register(registry, builtins);
}
