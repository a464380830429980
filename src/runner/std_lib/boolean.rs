use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInType, MethodRegistry, TypeKey};
use crate::runner::plugin::types::EvalContext;

pub fn register(registry: &mut MethodRegistry) {
    let boolean = BuiltInType::new(TypeKey::Boolean)
        .add_method("&&", &["that"], boolean_and)
        .add_method("||", &["that"], boolean_or)
        .add_method("not", &[], boolean_not)
        .add_method("if_then_else", &["when_true", "when_false"], boolean_if_then_else);
    registry.register_type(boolean);
}

fn operand(value: &Value) -> Result<bool, RuntimeError> {
    value
        .as_boolean()
        .ok_or_else(|| BuiltinError::type_error("Boolean", value.clone()).into())
}

fn boolean_and(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(operand(&args[0])? && operand(&args[1])?))
}

fn boolean_or(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(operand(&args[0])? || operand(&args[1])?))
}

fn boolean_not(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(!operand(&args[0])?))
}

fn boolean_if_then_else(_ctx: &mut EvalContext, mut args: Vec<Value>) -> Result<Value, RuntimeError> {
    let when_false = args.pop().unwrap_or(Value::Boolean(false));
    let when_true = args.pop().unwrap_or(Value::Boolean(true));
    if operand(&args[0])? {
        Ok(when_true)
    } else {
        Ok(when_false)
    }
}
