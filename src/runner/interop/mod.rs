//! The interop protocol: the closed set of generic operations every value
//! supports when observed by foreign code, plus the host interop resolver.
//!
//! Host objects implement [`InteropObject`] directly. Interpreter values
//! get the same protocol through [`library`], implemented once per value
//! kind, so guest code can use them through boundary proxies.

pub mod host;
pub mod host_call;
pub mod library;

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use thiserror::Error;

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;
use crate::runner::std_lib::core::Builtins;

/// Failure of an interop operation, in the foreign calling convention
/// (arity does not count the receiver).
#[derive(Debug, Clone, Error)]
pub enum InteropError {
    #[error("Unsupported interop message")]
    UnsupportedMessage,
    #[error("Unknown identifier `{0}`")]
    UnknownIdentifier(String),
    #[error("Expected {expected} arguments but got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("Unsupported argument types")]
    UnsupportedType(Vec<Value>),
    #[error("Invalid array index {0}")]
    InvalidArrayIndex(i64),
    #[error(transparent)]
    Raised(#[from] RuntimeError),
}

impl InteropError {
    /// Maps the error for code running on the guest side, where there is no
    /// receiver slot to account for.
    pub fn into_runtime(self, receiver: &Value, language: &str) -> RuntimeError {
        match self {
            InteropError::Raised(err) => err,
            InteropError::Arity { expected, actual } => {
                BuiltinError::ArityError { expected, actual }.into()
            }
            InteropError::UnsupportedType(values) => {
                BuiltinError::UnsupportedArguments { values }.into()
            }
            InteropError::InvalidArrayIndex(index) => BuiltinError::InvalidArrayIndex {
                receiver: receiver.clone(),
                index,
            }
            .into(),
            other => RuntimeError::foreign_eval(language, other.to_string()),
        }
    }
}

impl From<BuiltinError> for InteropError {
    fn from(err: BuiltinError) -> Self {
        InteropError::Raised(err.into())
    }
}

/// A value as produced by foreign code, before result conversion.
#[derive(Debug, Clone)]
pub enum HostValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    BigInteger(BigInt),
    Object(Rc<dyn InteropObject>),
    /// Already an interpreter value, no conversion needed.
    Native(Value),
}

impl HostValue {
    /// Result conversion into the interpreter's value union.
    pub fn into_value(self, builtins: &Builtins) -> Value {
        match self {
            HostValue::Null => builtins.nothing(),
            HostValue::Boolean(b) => Value::Boolean(b),
            HostValue::Byte(b) => Value::Integer(b as i64),
            HostValue::Short(s) => Value::Integer(s as i64),
            HostValue::Int(i) => Value::Integer(i as i64),
            HostValue::Long(l) => Value::Integer(l),
            HostValue::Float(f) => Value::Decimal(f as f64),
            HostValue::Double(d) => Value::Decimal(d),
            HostValue::Char(c) => Value::text(c.encode_utf8(&mut [0; 4])),
            HostValue::String(s) => Value::text(&s),
            HostValue::BigInteger(b) => Value::from_bigint(b),
            HostValue::Object(o) => Value::Host(o),
            HostValue::Native(v) => v,
        }
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        HostValue::Native(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Long(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Int(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Double(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Boolean(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

/// Generic operations a foreign object can support. Every operation has a
/// default meaning "not supported", so implementors only override what
/// they expose. Guards never fail; actions are only called after their
/// guard answered `true`.
pub trait InteropObject: fmt::Debug {
    /// Language the object belongs to. `None` means a plain host object.
    fn language(&self) -> Option<&str> {
        None
    }

    fn is_null(&self, _ctx: &EvalContext) -> bool {
        false
    }

    fn has_members(&self, ctx: &EvalContext) -> bool {
        !self.members(ctx).is_empty()
    }

    fn members(&self, _ctx: &EvalContext) -> Vec<String> {
        Vec::new()
    }

    fn is_member_invocable(&self, _ctx: &EvalContext, _name: &str) -> bool {
        false
    }

    fn invoke_member(
        &self,
        _ctx: &mut EvalContext,
        name: &str,
        _args: Vec<Value>,
    ) -> Result<HostValue, InteropError> {
        Err(InteropError::UnknownIdentifier(name.to_string()))
    }

    fn is_member_readable(&self, _ctx: &EvalContext, _name: &str) -> bool {
        false
    }

    fn read_member(&self, _ctx: &mut EvalContext, name: &str) -> Result<HostValue, InteropError> {
        Err(InteropError::UnknownIdentifier(name.to_string()))
    }

    fn is_executable(&self, _ctx: &EvalContext) -> bool {
        false
    }

    fn execute(&self, _ctx: &mut EvalContext, _args: Vec<Value>) -> Result<HostValue, InteropError> {
        Err(InteropError::UnsupportedMessage)
    }

    fn is_instantiable(&self, _ctx: &EvalContext) -> bool {
        false
    }

    fn instantiate(
        &self,
        _ctx: &mut EvalContext,
        _args: Vec<Value>,
    ) -> Result<HostValue, InteropError> {
        Err(InteropError::UnsupportedMessage)
    }

    fn has_array_elements(&self, _ctx: &EvalContext) -> bool {
        false
    }

    fn array_size(&self, _ctx: &EvalContext) -> Result<usize, InteropError> {
        Err(InteropError::UnsupportedMessage)
    }

    fn read_array_element(
        &self,
        _ctx: &mut EvalContext,
        _index: i64,
    ) -> Result<HostValue, InteropError> {
        Err(InteropError::UnsupportedMessage)
    }
}
