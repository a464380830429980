//! Array built-ins.

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::{Array, Value};
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

pub fn register(registry: &mut MethodRegistry) {
    let array = BuiltInType::new(TypeKey::Array)
        .add_method("length", &[], array_length)
        .add_method("at", &["index"], array_at)
        .add_method("set_at", &["index", "value"], array_set_at);
    registry.register_type(array);
}

fn receiver(value: &Value) -> Result<&Array, RuntimeError> {
    match value {
        Value::Array(a) => Ok(a),
        other => Err(BuiltinError::type_error("Array", other.clone()).into()),
    }
}

fn index(value: &Value) -> Result<i64, RuntimeError> {
    value
        .as_integer()
        .ok_or_else(|| BuiltinError::type_error("Integer", value.clone()).into())
}

fn array_length(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(receiver(&args[0])?.len() as i64))
}

fn array_at(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let i = index(&args[1])?;
    receiver(&args[0])?.get(i).ok_or_else(|| {
        BuiltinError::InvalidArrayIndex {
            receiver: args[0].clone(),
            index: i,
        }
        .into()
    })
}

/// Updates in place and returns the array.
fn array_set_at(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let i = index(&args[1])?;
    if !receiver(&args[0])?.set(i, args[2].clone()) {
        return Err(BuiltinError::InvalidArrayIndex {
            receiver: args[0].clone(),
            index: i,
        }
        .into());
    }
    Ok(args[0].clone())
}
