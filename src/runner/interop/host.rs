//! Ready-made host-side objects for embedders and tests.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::{HostValue, InteropError, InteropObject};
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

pub type HostFn = Rc<dyn Fn(&mut EvalContext, Vec<Value>) -> Result<HostValue, InteropError>>;

/// A host callable with a declared parameter count.
#[derive(Clone)]
pub struct HostMethod {
    arity: usize,
    body: HostFn,
}

impl HostMethod {
    pub fn new<F>(arity: usize, body: F) -> Self
    where
        F: Fn(&mut EvalContext, Vec<Value>) -> Result<HostValue, InteropError> + 'static,
    {
        HostMethod {
            arity,
            body: Rc::new(body),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, ctx: &mut EvalContext, args: Vec<Value>) -> Result<HostValue, InteropError> {
        if args.len() != self.arity {
            return Err(InteropError::Arity {
                expected: self.arity,
                actual: args.len(),
            });
        }
        (self.body)(ctx, args)
    }
}

/// A host object with readable fields, invocable methods and optionally a
/// constructor.
pub struct HostObject {
    class_name: String,
    fields: BTreeMap<String, HostValue>,
    methods: BTreeMap<String, HostMethod>,
    constructor: Option<HostMethod>,
    call: Option<HostMethod>,
    language: Option<String>,
}

impl HostObject {
    pub fn new(class_name: &str) -> Self {
        HostObject {
            class_name: class_name.to_string(),
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
            constructor: None,
            call: None,
            language: None,
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<HostValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_method<F>(mut self, name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(&mut EvalContext, Vec<Value>) -> Result<HostValue, InteropError> + 'static,
    {
        self.methods
            .insert(name.to_string(), HostMethod::new(arity, body));
        self
    }

    pub fn with_constructor<F>(mut self, arity: usize, body: F) -> Self
    where
        F: Fn(&mut EvalContext, Vec<Value>) -> Result<HostValue, InteropError> + 'static,
    {
        self.constructor = Some(HostMethod::new(arity, body));
        self
    }

    /// Makes the object itself callable.
    pub fn with_call<F>(mut self, arity: usize, body: F) -> Self
    where
        F: Fn(&mut EvalContext, Vec<Value>) -> Result<HostValue, InteropError> + 'static,
    {
        self.call = Some(HostMethod::new(arity, body));
        self
    }

    /// Tags the object as belonging to another language.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<host {}>", self.class_name)
    }
}

impl InteropObject for HostObject {
    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn members(&self, _ctx: &EvalContext) -> Vec<String> {
        self.fields
            .keys()
            .chain(self.methods.keys())
            .cloned()
            .collect()
    }

    fn is_member_invocable(&self, _ctx: &EvalContext, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    fn invoke_member(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
    ) -> Result<HostValue, InteropError> {
        match self.methods.get(name) {
            Some(method) => method.call(ctx, args),
            None => Err(InteropError::UnknownIdentifier(name.to_string())),
        }
    }

    fn is_member_readable(&self, _ctx: &EvalContext, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn read_member(&self, _ctx: &mut EvalContext, name: &str) -> Result<HostValue, InteropError> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| InteropError::UnknownIdentifier(name.to_string()))
    }

    fn is_executable(&self, _ctx: &EvalContext) -> bool {
        self.call.is_some()
    }

    fn execute(&self, ctx: &mut EvalContext, args: Vec<Value>) -> Result<HostValue, InteropError> {
        match &self.call {
            Some(call) => call.call(ctx, args),
            None => Err(InteropError::UnsupportedMessage),
        }
    }

    fn is_instantiable(&self, _ctx: &EvalContext) -> bool {
        self.constructor.is_some()
    }

    fn instantiate(
        &self,
        ctx: &mut EvalContext,
        args: Vec<Value>,
    ) -> Result<HostValue, InteropError> {
        match &self.constructor {
            Some(constructor) => constructor.call(ctx, args),
            None => Err(InteropError::UnsupportedMessage),
        }
    }
}

/// A host-side array of foreign values.
pub struct HostArray {
    items: Vec<HostValue>,
}

impl HostArray {
    pub fn new(items: Vec<HostValue>) -> Self {
        HostArray { items }
    }

    pub fn of_longs(items: &[i64]) -> Self {
        HostArray::new(items.iter().map(|i| HostValue::Long(*i)).collect())
    }
}

impl fmt::Debug for HostArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<host array of {}>", self.items.len())
    }
}

impl InteropObject for HostArray {
    fn has_array_elements(&self, _ctx: &EvalContext) -> bool {
        true
    }

    fn array_size(&self, _ctx: &EvalContext) -> Result<usize, InteropError> {
        Ok(self.items.len())
    }

    fn read_array_element(
        &self,
        _ctx: &mut EvalContext,
        index: i64,
    ) -> Result<HostValue, InteropError> {
        if index < 0 {
            return Err(InteropError::InvalidArrayIndex(index));
        }
        self.items
            .get(index as usize)
            .cloned()
            .ok_or(InteropError::InvalidArrayIndex(index))
    }
}
