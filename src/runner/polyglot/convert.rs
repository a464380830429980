use std::rc::Rc;

use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::value::Value;
use crate::runner::polyglot::proxy::BoundaryProxy;

/// Converts a value owned by `from` so it can be observed from `to`.
/// Integers pass unchanged, a proxy returning to its owner is unwrapped and
/// anything else is wrapped in a new proxy. A panic sentinel never crosses:
/// it is raised instead.
pub fn convert(
    value: Value,
    from: &ExecutionContext,
    to: &ExecutionContext,
) -> Result<Value, RuntimeError> {
    if let Value::PanicSentinel(sentinel) = &value {
        return Err(sentinel.reraise());
    }
    if from == to {
        return Ok(value);
    }
    Ok(match value {
        Value::Integer(_) => value,
        Value::Proxy(proxy) if proxy.owner() == to => proxy.delegate().clone(),
        other => Value::Proxy(Rc::new(BoundaryProxy::new(other, from.clone(), to.clone()))),
    })
}

pub fn outer_to_inner(
    value: Value,
    outer: &ExecutionContext,
    inner: &ExecutionContext,
) -> Result<Value, RuntimeError> {
    convert(value, outer, inner)
}

pub fn inner_to_outer(
    value: Value,
    inner: &ExecutionContext,
    outer: &ExecutionContext,
) -> Result<Value, RuntimeError> {
    convert(value, inner, outer)
}
