//! `State.get key` and `State.put key value`.
//!
//! The receiver is the builtin `State` type itself; the values live in the
//! state threaded through the call.

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

use super::core::Builtins;

pub fn register(registry: &mut MethodRegistry, builtins: &Builtins) {
    let state = BuiltInType::new(TypeKey::Atom(builtins.state_constructor().id()))
        .add_stateful_method("get", &["key"], state_get)
        .add_stateful_method("put", &["key", "value"], state_put);
    registry.register_type(state);
}

fn key(value: &Value) -> Result<&str, RuntimeError> {
    value
        .as_text()
        .ok_or_else(|| BuiltinError::type_error("Text", value.clone()).into())
}

fn state_get(_ctx: &mut EvalContext, state: State, args: Vec<Value>) -> Result<Stateful, RuntimeError> {
    let value = state
        .get(key(&args[1])?)
        .cloned()
        .ok_or_else(|| RuntimeError::Panic(Value::text("Uninitialized_State")))?;
    Ok(Stateful::new(state, value))
}

fn state_put(_ctx: &mut EvalContext, state: State, args: Vec<Value>) -> Result<Stateful, RuntimeError> {
    let state = state.put(key(&args[1])?, args[2].clone());
    Ok(Stateful::new(state, args[2].clone()))
}
