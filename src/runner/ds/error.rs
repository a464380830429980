use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::runner::ds::value::Value;

/// Errors raised by builtins and by dispatch itself. When recovered, these
/// become the payload of a dataflow error.
#[derive(Debug, Clone, Error)]
pub enum BuiltinError {
    #[error("Method `{method}` of {} could not be found.", .receiver.type_name())]
    NoSuchMethod { receiver: Value, method: Rc<str> },
    #[error("Wrong number of arguments. Expected {expected}, but got {actual}.")]
    ArityError { expected: usize, actual: usize },
    #[error("Unsupported argument types: {}.", render_values(.values))]
    UnsupportedArguments { values: Vec<Value> },
    #[error("Type error: expected `{}` to be {expected}, but got {}.", .actual, .actual.type_name())]
    TypeError { expected: Rc<str>, actual: Value },
    #[error("Invalid array index {index} for {receiver}.")]
    InvalidArrayIndex { receiver: Value, index: i64 },
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl BuiltinError {
    pub fn type_error(expected: &str, actual: Value) -> Self {
        BuiltinError::TypeError {
            expected: Rc::from(expected),
            actual,
        }
    }

    pub fn no_such_method(receiver: Value, method: &str) -> Self {
        BuiltinError::NoSuchMethod {
            receiver,
            method: Rc::from(method),
        }
    }

    /// Short tag used in logs and when rendering the error as text.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BuiltinError::NoSuchMethod { .. } => "No_Such_Method",
            BuiltinError::ArityError { .. } => "Arity_Error",
            BuiltinError::UnsupportedArguments { .. } => "Unsupported_Argument_Types",
            BuiltinError::TypeError { .. } => "Type_Error",
            BuiltinError::InvalidArrayIndex { .. } => "Invalid_Array_Index",
        }
    }
}

/// Anything that can abort an evaluation step.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error("Panic: {0}")]
    Panic(Value),
    #[error("{}", .0.cause())]
    Sentinel(Rc<PanicSentinel>),
    #[error("Values of language `{language}` are not supported by this context.")]
    UnsupportedInterop { language: Rc<str> },
    #[error("Could not parse {language} source: {message}")]
    ForeignParse { language: Rc<str>, message: String },
    #[error("Evaluation failed in {language}: {message}")]
    ForeignEval { language: Rc<str>, message: String },
    #[error("No language installed for id `{0}`.")]
    UnknownLanguage(Rc<str>),
}

impl RuntimeError {
    pub fn foreign_eval(language: &str, message: impl Into<String>) -> Self {
        RuntimeError::ForeignEval {
            language: Rc::from(language),
            message: message.into(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, RuntimeError::Sentinel(_))
    }

    /// Turns the error into a dataflow error value. Sentinels are not
    /// recoverable and are handed back unchanged.
    pub fn recover(self) -> Result<Value, RuntimeError> {
        match self {
            RuntimeError::Sentinel(_) => Err(self),
            RuntimeError::Builtin(err) => Ok(Value::Error(Rc::new(DataflowError::from_builtin(err)))),
            RuntimeError::Panic(payload) => Ok(Value::Error(Rc::new(DataflowError::new(payload)))),
            other => Ok(Value::Error(Rc::new(DataflowError::new(Value::text(
                &other.to_string(),
            ))))),
        }
    }

    /// Wraps the error into a sentinel that downstream code must re-raise.
    pub fn into_sentinel(self) -> Value {
        match self {
            RuntimeError::Sentinel(s) => Value::PanicSentinel(s),
            other => Value::PanicSentinel(Rc::new(PanicSentinel { cause: other })),
        }
    }
}

/// A recoverable error value. Method calls on it are absorbed unless its
/// own type defines the method.
pub struct DataflowError {
    payload: Value,
    builtin: Option<BuiltinError>,
}

impl DataflowError {
    pub fn new(payload: Value) -> Self {
        DataflowError {
            payload,
            builtin: None,
        }
    }

    pub fn from_builtin(err: BuiltinError) -> Self {
        DataflowError {
            payload: Value::text(&err.to_string()),
            builtin: Some(err),
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn builtin(&self) -> Option<&BuiltinError> {
        self.builtin.as_ref()
    }
}

impl fmt::Debug for DataflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataflowError({:?})", self.payload)
    }
}

impl fmt::Display for DataflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.builtin {
            Some(err) => write!(f, "(Error: {} {})", err.kind_name(), self.payload),
            None => write!(f, "(Error: {})", self.payload),
        }
    }
}

/// Marks a panic that already escaped a context. Always re-raised.
pub struct PanicSentinel {
    cause: RuntimeError,
}

impl PanicSentinel {
    pub fn new(cause: RuntimeError) -> Self {
        PanicSentinel { cause }
    }

    pub fn cause(&self) -> &RuntimeError {
        &self.cause
    }

    pub fn reraise(self: &Rc<Self>) -> RuntimeError {
        RuntimeError::Sentinel(self.clone())
    }
}

impl fmt::Debug for PanicSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanicSentinel({:?})", self.cause)
    }
}

impl fmt::Display for PanicSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Panic: {})", self.cause)
    }
}
