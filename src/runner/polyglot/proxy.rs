use std::fmt;

use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::value::Value;
use crate::runner::interop::{library, InteropError};
use crate::runner::plugin::types::EvalContext;
use crate::runner::polyglot::convert::convert;

/// A value owned by one context and observed from another.
///
/// Every operation enters the owning context, runs on the delegate and
/// leaves again, also when the operation fails. Arguments are converted
/// toward the owner and results toward the observer. Only the fixed
/// operation set below is exposed.
pub struct BoundaryProxy {
    delegate: Value,
    owner: ExecutionContext,
    observer: ExecutionContext,
}

impl BoundaryProxy {
    pub(crate) fn new(delegate: Value, owner: ExecutionContext, observer: ExecutionContext) -> Self {
        BoundaryProxy {
            delegate,
            owner,
            observer,
        }
    }

    pub(crate) fn delegate(&self) -> &Value {
        &self.delegate
    }

    pub(crate) fn owner(&self) -> &ExecutionContext {
        &self.owner
    }

    fn inbound(&self, args: Vec<Value>) -> Result<Vec<Value>, InteropError> {
        args.into_iter()
            .map(|arg| convert(arg, &self.observer, &self.owner).map_err(InteropError::Raised))
            .collect()
    }

    fn outbound(&self, value: Value) -> Result<Value, InteropError> {
        convert(value, &self.owner, &self.observer).map_err(InteropError::Raised)
    }

    pub fn is_null(&self, ctx: &EvalContext) -> bool {
        let _guard = self.owner.enter();
        library::is_null(ctx, &self.delegate)
    }

    pub fn has_members(&self, ctx: &EvalContext) -> bool {
        let _guard = self.owner.enter();
        library::has_members(ctx, &self.delegate)
    }

    pub fn members(&self, ctx: &EvalContext) -> Vec<String> {
        let _guard = self.owner.enter();
        library::members(ctx, &self.delegate)
    }

    pub fn is_member_invocable(&self, ctx: &EvalContext, name: &str) -> bool {
        let _guard = self.owner.enter();
        library::is_member_invocable(ctx, &self.delegate, name)
    }

    pub fn is_member_readable(&self, ctx: &EvalContext, name: &str) -> bool {
        let _guard = self.owner.enter();
        library::is_member_readable(ctx, &self.delegate, name)
    }

    pub fn is_executable(&self, ctx: &EvalContext) -> bool {
        let _guard = self.owner.enter();
        library::is_executable(ctx, &self.delegate)
    }

    pub fn invoke_member(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, InteropError> {
        let _guard = self.owner.enter();
        let args = self.inbound(args)?;
        let result = library::invoke_member(ctx, &self.delegate, name, args)?;
        self.outbound(result)
    }

    pub fn read_member(&self, ctx: &mut EvalContext, name: &str) -> Result<Value, InteropError> {
        let _guard = self.owner.enter();
        let result = library::read_member(ctx, &self.delegate, name)?;
        self.outbound(result)
    }

    pub fn execute(&self, ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, InteropError> {
        let _guard = self.owner.enter();
        let args = self.inbound(args)?;
        let result = library::execute(ctx, &self.delegate, args)?;
        self.outbound(result)
    }

    pub fn has_array_elements(&self, ctx: &EvalContext) -> bool {
        let _guard = self.owner.enter();
        library::has_array_elements(ctx, &self.delegate)
    }

    pub fn array_size(&self, ctx: &EvalContext) -> Result<usize, InteropError> {
        let _guard = self.owner.enter();
        library::array_size(ctx, &self.delegate)
    }

    pub fn read_array_element(&self, ctx: &mut EvalContext, index: i64) -> Result<Value, InteropError> {
        let _guard = self.owner.enter();
        let result = library::read_array_element(ctx, &self.delegate, index)?;
        self.outbound(result)
    }
}

impl fmt::Display for BoundaryProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _guard = self.owner.enter();
        write!(f, "{}", self.delegate)
    }
}

impl fmt::Debug for BoundaryProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundaryProxy(owned by {:?})", self.owner)
    }
}
