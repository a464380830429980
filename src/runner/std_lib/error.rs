//! Methods of propagated errors. Anything not listed here is absorbed by
//! the dispatcher and the error flows on unchanged.

use crate::runner::dispatch::arguments::{invoke_function, DefaultsMode};
use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

pub fn register(registry: &mut MethodRegistry) {
    let error = BuiltInType::new(TypeKey::Error)
        .add_stateful_method("catch", &["handler"], error_catch)
        .add_method("is_error", &[], error_is_error)
        .add_method("to_text", &[], error_to_text);
    registry.register_type(error);
}

fn error_catch(
    ctx: &mut EvalContext,
    state: State,
    args: Vec<Value>,
) -> Result<Stateful, RuntimeError> {
    let payload = match &args[0] {
        Value::Error(err) => err.payload().clone(),
        other => return Err(BuiltinError::type_error("Error", other.clone()).into()),
    };
    match &args[1] {
        Value::Function(handler) => {
            invoke_function(ctx, handler, vec![payload], &[], DefaultsMode::Execute, state)
        }
        other => Err(BuiltinError::type_error("Function", other.clone()).into()),
    }
}

fn error_is_error(_ctx: &mut EvalContext, _args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(true))
}

fn error_to_text(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::text(&args[0].to_string()))
}
