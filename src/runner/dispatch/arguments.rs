//! Argument alignment against a callee's formal parameters.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::function_object::Function;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

/// How one supplied argument is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentRole {
    Positional,
    Named(Rc<str>),
    /// Placeholder asking for the declared default of the next positional formal.
    Defaulted,
}

impl ArgumentRole {
    pub fn named(name: &str) -> Self {
        ArgumentRole::Named(Rc::from(name))
    }
}

/// What happens to omitted formals that declare a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultsMode {
    /// Fill them from their defaults.
    #[default]
    Execute,
    /// Leave them unapplied, yielding a partial application.
    Ignore,
}

pub enum Aligned {
    Complete(Vec<Value>),
    Partial(Function),
}

/// Places `args` into the callee's formal slots according to `schema`.
/// Roles missing from `schema` are positional.
pub fn align(
    function: &Function,
    args: Vec<Value>,
    schema: &[ArgumentRole],
    defaults: DefaultsMode,
) -> Result<Aligned, BuiltinError> {
    let formals = function.args();
    let mut slots: Vec<Option<Value>> = match function.preapplied() {
        Some(pre) => pre.to_vec(),
        None => vec![None; formals.len()],
    };
    let preapplied = slots.iter().filter(|s| s.is_some()).count();
    let arity_error = |supplied: usize| BuiltinError::ArityError {
        expected: formals.len(),
        actual: preapplied + supplied,
    };
    let supplied = args.len();

    let mut positional = Vec::new();
    for (idx, arg) in args.into_iter().enumerate() {
        match schema.get(idx).unwrap_or(&ArgumentRole::Positional) {
            ArgumentRole::Named(name) => {
                let slot = formals
                    .iter()
                    .position(|f| f.name == *name)
                    .ok_or_else(|| arity_error(supplied))?;
                if slots[slot].is_some() {
                    return Err(arity_error(supplied));
                }
                slots[slot] = Some(arg);
            }
            role => positional.push((role.clone(), arg)),
        }
    }

    for (role, arg) in positional {
        let slot = slots
            .iter()
            .position(|s| s.is_none())
            .ok_or_else(|| arity_error(supplied))?;
        let value = match role {
            ArgumentRole::Defaulted => formals[slot].default.clone().unwrap_or(arg),
            _ => arg,
        };
        slots[slot] = Some(value);
    }

    if defaults == DefaultsMode::Execute {
        for (slot, formal) in slots.iter_mut().zip(formals.iter()) {
            if slot.is_none() {
                if let Some(default) = &formal.default {
                    *slot = Some(default.clone());
                }
            }
        }
    }

    if slots.iter().all(|s| s.is_some()) {
        Ok(Aligned::Complete(slots.into_iter().flatten().collect()))
    } else {
        Ok(Aligned::Partial(function.with_preapplied(slots)))
    }
}

/// Aligns and invokes. An incomplete application returns the partially
/// applied function without running the body.
pub fn invoke_function(
    ctx: &mut EvalContext,
    function: &Function,
    args: Vec<Value>,
    schema: &[ArgumentRole],
    defaults: DefaultsMode,
    state: State,
) -> Result<Stateful, RuntimeError> {
    match align(function, args, schema, defaults)? {
        Aligned::Complete(args) => function.call_body(ctx, state, args),
        Aligned::Partial(partial) => Ok(Stateful::new(state, Value::Function(partial))),
    }
}
