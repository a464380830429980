//! Text built-ins. Lengths count characters, not bytes.

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

pub fn register(registry: &mut MethodRegistry) {
    let text = BuiltInType::new(TypeKey::Text)
        .add_method("length", &[], text_length)
        .add_method("+", &["that"], text_concat)
        .add_method("is_empty", &[], text_is_empty)
        .add_method("characters", &[], text_characters);
    registry.register_type(text);
}

fn receiver(value: &Value) -> Result<&str, RuntimeError> {
    value
        .as_text()
        .ok_or_else(|| BuiltinError::type_error("Text", value.clone()).into())
}

fn text_length(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(receiver(&args[0])?.chars().count() as i64))
}

fn text_concat(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(&args[0])?;
    let that = args[1].as_text().ok_or_else(|| BuiltinError::UnsupportedArguments {
        values: vec![args[1].clone()],
    })?;
    let mut joined = String::with_capacity(this.len() + that.len());
    joined.push_str(this);
    joined.push_str(that);
    Ok(Value::text(&joined))
}

fn text_is_empty(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(receiver(&args[0])?.is_empty()))
}

fn text_characters(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let chars = receiver(&args[0])?
        .chars()
        .map(|c| Value::text(c.encode_utf8(&mut [0; 4])))
        .collect();
    Ok(Value::array(chars))
}
