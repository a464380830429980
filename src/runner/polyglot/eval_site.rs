use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;
use uuid::Uuid;

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;
use crate::runner::polyglot::convert::{inner_to_outer, outer_to_inner};
use crate::runner::polyglot::CallTarget;

/// An embedded evaluation call site: a guest snippet with named parameters.
///
/// The snippet is parsed on first execution and the call target is reused
/// afterwards. A failed parse is not memoized.
pub struct ForeignEval {
    id: Uuid,
    language: Rc<str>,
    source: Rc<str>,
    arg_names: Vec<Rc<str>>,
    target: OnceCell<Rc<dyn CallTarget>>,
}

impl ForeignEval {
    pub fn new(language: &str, source: &str, arg_names: &[&str]) -> Self {
        ForeignEval {
            id: Uuid::new_v4(),
            language: Rc::from(language),
            source: Rc::from(source),
            arg_names: arg_names.iter().map(|n| Rc::from(*n)).collect(),
            target: OnceCell::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn arg_names(&self) -> &[Rc<str>] {
        &self.arg_names
    }

    pub fn is_parsed(&self) -> bool {
        self.target.get().is_some()
    }

    fn call_target(&self, ctx: &EvalContext) -> Result<Rc<dyn CallTarget>, RuntimeError> {
        if let Some(target) = self.target.get() {
            return Ok(target.clone());
        }
        let language = ctx.polyglot().language(&self.language)?;
        debug!(site = %self.id, language = %self.language, "parsing snippet");
        let target = language.parse(&self.source, &self.arg_names)?;
        Ok(self.target.get_or_init(|| target).clone())
    }

    /// Runs the snippet with host-side `args`. Arguments are converted into
    /// the inner context and the result back out of it.
    pub fn execute(
        &self,
        ctx: &mut EvalContext,
        state: State,
        args: Vec<Value>,
    ) -> Result<Stateful, RuntimeError> {
        if args.len() != self.arg_names.len() {
            return Err(BuiltinError::ArityError {
                expected: self.arg_names.len(),
                actual: args.len(),
            }
            .into());
        }
        if let Some(Value::PanicSentinel(sentinel)) =
            args.iter().find(|a| matches!(a, Value::PanicSentinel(_)))
        {
            return Err(sentinel.reraise());
        }

        let target = self.call_target(ctx)?;
        let inner = ctx.polyglot().inner().clone();
        if inner.is_active() {
            let outer = inner
                .parent()
                .cloned()
                .unwrap_or_else(|| ctx.polyglot().host().clone());
            run(ctx, target.as_ref(), &outer, &inner, state, args)
        } else {
            let outer = ctx.polyglot().host().clone();
            let _guard = inner.enter();
            run(ctx, target.as_ref(), &outer, &inner, state, args)
        }
    }
}

fn run(
    ctx: &mut EvalContext,
    target: &dyn CallTarget,
    outer: &ExecutionContext,
    inner: &ExecutionContext,
    state: State,
    args: Vec<Value>,
) -> Result<Stateful, RuntimeError> {
    let inner_args = args
        .into_iter()
        .map(|arg| outer_to_inner(arg, outer, inner))
        .collect::<Result<Vec<_>, _>>()?;
    let Stateful { state, value } = target.call(ctx, state, inner_args)?;
    Ok(Stateful::new(state, inner_to_outer(value, inner, outer)?))
}

impl fmt::Debug for ForeignEval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignEval({} {:?})", self.language, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_is_not_memoized() {
        let mut ctx = EvalContext::new();
        let eval = ForeignEval::new("calc", "1 +", &[]);
        let err = eval.execute(&mut ctx, State::empty(), vec![]).unwrap_err();
        assert!(matches!(err, RuntimeError::ForeignParse { .. }));
        assert!(!eval.is_parsed());
    }

    #[test]
    fn test_unknown_language() {
        let mut ctx = EvalContext::new();
        let eval = ForeignEval::new("cobol", "1", &[]);
        assert!(matches!(
            eval.execute(&mut ctx, State::empty(), vec![]),
            Err(RuntimeError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_argument_count_checked() {
        let mut ctx = EvalContext::new();
        let eval = ForeignEval::new("calc", "a + b", &["a", "b"]);
        let err = eval
            .execute(&mut ctx, State::empty(), vec![Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Builtin(BuiltinError::ArityError {
                expected: 2,
                actual: 1
            })
        ));
    }
}
