//! Methods every value understands.

use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

pub fn register(registry: &mut MethodRegistry) {
    let any = BuiltInType::new(TypeKey::Any)
        .add_method("to_text", &[], any_to_text)
        .add_method("is_error", &[], any_is_error)
        .add_method("is_nothing", &[], any_is_nothing)
        .add_method("==", &["that"], any_equals);

    registry.register_type(any);
}

fn any_to_text(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::text(&args[0].to_string()))
}

fn any_is_error(_ctx: &mut EvalContext, _args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(false))
}

fn any_is_nothing(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(args[0].is_nothing()))
}

fn any_equals(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(args[0] == args[1]))
}
