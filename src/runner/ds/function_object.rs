use std::fmt;
use std::rc::Rc;

use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;
use crate::runner::polyglot::ForeignEval;

pub type NativeFn = Rc<dyn Fn(&mut EvalContext, State, Vec<Value>) -> Result<Stateful, RuntimeError>>;

pub enum FunctionBody {
    Native(NativeFn),
    /// A guest-language snippet evaluated through the context bridge.
    Foreign(Rc<ForeignEval>),
}

#[derive(Clone, Debug)]
pub struct ArgumentDefinition {
    pub name: Rc<str>,
    pub default: Option<Value>,
}

impl ArgumentDefinition {
    pub fn new(name: &str) -> Self {
        ArgumentDefinition {
            name: Rc::from(name),
            default: None,
        }
    }

    pub fn with_default(name: &str, default: Value) -> Self {
        ArgumentDefinition {
            name: Rc::from(name),
            default: Some(default),
        }
    }
}

pub struct FunctionDef {
    pub name: Rc<str>,
    pub args: Vec<ArgumentDefinition>,
    pub body: FunctionBody,
}

/// A callable value. The first formal of a method is its receiver (`self`).
/// Partially applied functions carry the arguments supplied so far.
#[derive(Clone)]
pub struct Function {
    def: Rc<FunctionDef>,
    preapplied: Option<Rc<[Option<Value>]>>,
}

impl Function {
    pub fn new(name: &str, args: Vec<ArgumentDefinition>, body: FunctionBody) -> Self {
        Function {
            def: Rc::new(FunctionDef {
                name: Rc::from(name),
                args,
                body,
            }),
            preapplied: None,
        }
    }

    pub fn native<F>(name: &str, args: Vec<ArgumentDefinition>, f: F) -> Self
    where
        F: Fn(&mut EvalContext, State, Vec<Value>) -> Result<Stateful, RuntimeError> + 'static,
    {
        Function::new(name, args, FunctionBody::Native(Rc::new(f)))
    }

    pub fn foreign(eval: Rc<ForeignEval>) -> Self {
        let args = eval
            .arg_names()
            .iter()
            .map(|n| ArgumentDefinition::new(n))
            .collect();
        let name = format!("<{} snippet>", eval.language());
        Function::new(&name, args, FunctionBody::Foreign(eval))
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn args(&self) -> &[ArgumentDefinition] {
        &self.def.args
    }

    pub fn arity(&self) -> usize {
        self.def.args.len()
    }

    pub fn preapplied(&self) -> Option<&[Option<Value>]> {
        self.preapplied.as_deref()
    }

    /// Number of formals still waiting for an argument.
    pub fn remaining_arity(&self) -> usize {
        match &self.preapplied {
            Some(pre) => pre.iter().filter(|slot| slot.is_none()).count(),
            None => self.arity(),
        }
    }

    pub fn with_preapplied(&self, slots: Vec<Option<Value>>) -> Function {
        Function {
            def: self.def.clone(),
            preapplied: Some(Rc::from(slots)),
        }
    }

    /// Identity comparison. Two partial applications of the same definition
    /// are different functions.
    pub fn same(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.def, &other.def)
            && match (&self.preapplied, &other.preapplied) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
    }

    /// Runs the body with a complete, positionally ordered argument list.
    pub(crate) fn call_body(
        &self,
        ctx: &mut EvalContext,
        state: State,
        args: Vec<Value>,
    ) -> Result<Stateful, RuntimeError> {
        match &self.def.body {
            FunctionBody::Native(f) => f(ctx, state, args),
            FunctionBody::Foreign(eval) => eval.execute(ctx, state, args),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}/{})", self.def.name, self.arity())
    }
}
