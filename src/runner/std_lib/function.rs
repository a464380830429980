use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

pub fn register(registry: &mut MethodRegistry) {
    let function = BuiltInType::new(TypeKey::Function).add_method("arity", &[], function_arity);
    registry.register_type(function);
}

/// Formals still to be supplied, so a partial application reports less.
fn function_arity(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args[0].as_function() {
        Some(f) => Ok(Value::Integer(f.remaining_arity() as i64)),
        None => Err(BuiltinError::type_error("Function", args[0].clone()).into()),
    }
}
