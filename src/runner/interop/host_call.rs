//! Host interop resolver: maps a method call on a foreign receiver onto the
//! interop protocol.
//!
//! Resolution order, first match wins:
//! 1. invocable member named like the method
//! 2. readable field, only when no arguments are given
//! 3. `new` on an instantiable receiver
//! 4. `length` on a receiver with array elements
//! 5. `at` on a receiver with array elements
//!
//! Arity errors are reported in the interpreter's convention, where the
//! receiver occupies the first argument slot.

use std::rc::Rc;

use super::library;
use super::InteropError;
use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

pub const NEW_NAME: &str = "new";
pub const ARRAY_LENGTH_NAME: &str = "length";
pub const ARRAY_READ_NAME: &str = "at";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCallable {
    Method(Rc<str>),
    Field(Rc<str>),
    Constructor,
    ArrayLength,
    ArrayRead,
}

impl HostCallable {
    /// Returns `None` when no convention applies, leaving the caller free to
    /// try its generic fallback.
    pub fn resolve(
        ctx: &EvalContext,
        name: &str,
        receiver: &Value,
        args: &[Value],
    ) -> Option<HostCallable> {
        if library::is_member_invocable(ctx, receiver, name) {
            return Some(HostCallable::Method(Rc::from(name)));
        }
        if args.is_empty() && library::is_member_readable(ctx, receiver, name) {
            return Some(HostCallable::Field(Rc::from(name)));
        }
        if name == NEW_NAME && library::is_instantiable(ctx, receiver) {
            return Some(HostCallable::Constructor);
        }
        if name == ARRAY_LENGTH_NAME && library::has_array_elements(ctx, receiver) {
            return Some(HostCallable::ArrayLength);
        }
        if name == ARRAY_READ_NAME && library::has_array_elements(ctx, receiver) {
            return Some(HostCallable::ArrayRead);
        }
        None
    }

    pub fn invoke(
        &self,
        ctx: &mut EvalContext,
        receiver: &Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match self {
            HostCallable::Method(name) => library::invoke_member(ctx, receiver, name, args)
                .map_err(|err| host_error(err, receiver, "invoke_member")),
            HostCallable::Field(name) => library::read_member(ctx, receiver, name)
                .map_err(|err| host_error(err, receiver, "read_member")),
            HostCallable::Constructor => library::instantiate(ctx, receiver, args)
                .map_err(|err| host_error(err, receiver, "instantiate")),
            HostCallable::ArrayLength => {
                if !args.is_empty() {
                    return Err(BuiltinError::ArityError {
                        expected: 1,
                        actual: 1 + args.len(),
                    }
                    .into());
                }
                let size = library::array_size(ctx, receiver)
                    .map_err(|err| host_error(err, receiver, "array_size"))?;
                Ok(Value::Integer(size as i64))
            }
            HostCallable::ArrayRead => {
                if args.len() != 1 {
                    return Err(BuiltinError::ArityError {
                        expected: 2,
                        actual: 1 + args.len(),
                    }
                    .into());
                }
                let index = match &args[0] {
                    Value::Integer(index) => *index,
                    other => return Err(BuiltinError::type_error("Integer", other.clone()).into()),
                };
                library::read_array_element(ctx, receiver, index)
                    .map_err(|err| host_error(err, receiver, "read_array_element"))
            }
        }
    }
}

/// Interpreter-side mapping of a failed interop message. Messages that were
/// verified by the matching guard cannot be unsupported.
fn host_error(err: InteropError, receiver: &Value, message: &str) -> RuntimeError {
    match err {
        InteropError::Arity { expected, actual } => BuiltinError::ArityError {
            expected: expected + 1,
            actual: actual + 1,
        }
        .into(),
        InteropError::UnsupportedType(values) => {
            BuiltinError::UnsupportedArguments { values }.into()
        }
        InteropError::InvalidArrayIndex(index) => BuiltinError::InvalidArrayIndex {
            receiver: receiver.clone(),
            index,
        }
        .into(),
        InteropError::Raised(err) => err,
        InteropError::UnsupportedMessage | InteropError::UnknownIdentifier(_) => panic!(
            "Impossible interop failure: `{}` on {:?} passed its guard but failed with {}",
            message, receiver, err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::interop::host::{HostArray, HostObject};

    #[test]
    fn test_invocable_member_wins_over_conventions() {
        let ctx = EvalContext::new();
        let obj = Value::host(
            HostObject::new("Weird")
                .with_method("length", 0, |_, _| Ok(99i64.into()))
                .with_field("x", 1i64),
        );
        assert_eq!(
            HostCallable::resolve(&ctx, "length", &obj, &[]),
            Some(HostCallable::Method(Rc::from("length")))
        );
        assert_eq!(
            HostCallable::resolve(&ctx, "x", &obj, &[]),
            Some(HostCallable::Field(Rc::from("x")))
        );
        assert_eq!(
            HostCallable::resolve(&ctx, "x", &obj, &[Value::Integer(1)]),
            None
        );
    }

    #[test]
    fn test_array_conventions() {
        let mut ctx = EvalContext::new();
        let arr = Value::host(HostArray::of_longs(&[10, 20, 30]));
        let length = HostCallable::resolve(&ctx, "length", &arr, &[]).unwrap();
        assert_eq!(length.invoke(&mut ctx, &arr, vec![]).unwrap(), Value::Integer(3));
        let err = length
            .invoke(&mut ctx, &arr, vec![Value::Integer(0)])
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Builtin(BuiltinError::ArityError {
                expected: 1,
                actual: 2
            })
        ));
    }
}
