//! Generic method dispatch.
//!
//! [`dispatch`] classifies the receiver, picks the resolver for its kind (or
//! the host interop resolver for foreign values) and invokes the resolved
//! function, threading the state through. [`CallSite`] adds a bounded inline
//! cache in front of the same resolution, so cached and generic calls always
//! select the same function.

pub mod arguments;
pub mod cache;
pub mod call_site;

pub use arguments::{invoke_function, ArgumentRole, DefaultsMode};
pub use cache::{InlineCache, Target};
pub use call_site::CallSite;

use std::rc::Rc;

use tracing::{debug, warn};

use crate::runner::ds::error::{BuiltinError, RuntimeError};
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::{Value, ValueKind};
use crate::runner::interop::host_call::HostCallable;
use crate::runner::plugin::registry::MethodRegistry;
use crate::runner::plugin::resolver::{resolve_any, resolver_for, DispatchKey};
use crate::runner::plugin::types::EvalContext;
use crate::runner::polyglot::HOST_LANGUAGE;

/// Resolves `name` for a native receiver kind. Host values, proxies and
/// sentinels never reach this.
pub fn resolve_target(registry: &MethodRegistry, key: &DispatchKey, name: &str) -> Target {
    let resolved = resolver_for(key.kind).and_then(|resolve| resolve(registry, key, name));
    match (resolved, key.kind) {
        (Some(function), _) => Target::Method(function),
        (None, ValueKind::Error) => Target::Absorb,
        (None, _) => Target::Missing,
    }
}

/// Dispatches `name` on `receiver` without any call-site caching.
pub fn dispatch(
    ctx: &mut EvalContext,
    name: &str,
    receiver: Value,
    args: Vec<Value>,
    schema: &[ArgumentRole],
    defaults: DefaultsMode,
    state: State,
) -> Result<Stateful, RuntimeError> {
    match &receiver {
        Value::PanicSentinel(sentinel) => return Err(sentinel.reraise()),
        Value::Host(_) | Value::Proxy(_) => {
            return dispatch_foreign(ctx, name, receiver, args, schema, defaults, state)
        }
        _ => {}
    }
    let key = DispatchKey::of(&receiver);
    let target = resolve_target(ctx.registry(), &key, name);
    run_target(ctx, target, name, receiver, args, schema, defaults, state)
}

/// Dispatches with every argument positional, the common case for
/// callbacks coming from guest code.
pub fn dispatch_positional(
    ctx: &mut EvalContext,
    name: &str,
    receiver: Value,
    args: Vec<Value>,
    state: State,
) -> Result<Stateful, RuntimeError> {
    let defaults = ctx.config().dispatch.defaults;
    dispatch(ctx, name, receiver, args, &[], defaults, state)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_target(
    ctx: &mut EvalContext,
    target: Target,
    name: &str,
    receiver: Value,
    args: Vec<Value>,
    schema: &[ArgumentRole],
    defaults: DefaultsMode,
    state: State,
) -> Result<Stateful, RuntimeError> {
    match target {
        Target::Method(function) => {
            let mut full_args = Vec::with_capacity(args.len() + 1);
            full_args.push(receiver);
            full_args.extend(args);
            let mut full_schema = Vec::with_capacity(schema.len() + 1);
            full_schema.push(ArgumentRole::Positional);
            full_schema.extend_from_slice(schema);
            invoke_function(ctx, &function, full_args, &full_schema, defaults, state)
        }
        Target::Absorb => Ok(Stateful::new(state, receiver)),
        Target::Missing => Err(BuiltinError::NoSuchMethod {
            receiver,
            method: Rc::from(name),
        }
        .into()),
    }
}

fn dispatch_foreign(
    ctx: &mut EvalContext,
    name: &str,
    receiver: Value,
    args: Vec<Value>,
    schema: &[ArgumentRole],
    defaults: DefaultsMode,
    state: State,
) -> Result<Stateful, RuntimeError> {
    if let Value::Host(object) = &receiver {
        if let Some(language) = object.language() {
            if language != HOST_LANGUAGE {
                warn!(language, method = name, "dispatch onto a value of a third language");
                return Err(RuntimeError::UnsupportedInterop {
                    language: Rc::from(language),
                });
            }
        }
    }

    if let Some(callable) = HostCallable::resolve(ctx, name, &receiver, &args) {
        debug!(method = name, ?callable, "host interop resolution");
        let (state, result) =
            ctx.with_interop_state(state, |ctx| callable.invoke(ctx, &receiver, args));
        return Ok(Stateful::new(state, result?));
    }

    let key = DispatchKey::of(&receiver);
    match resolve_any(ctx.registry(), &key, name) {
        Some(function) => run_target(
            ctx,
            Target::Method(function),
            name,
            receiver,
            args,
            schema,
            defaults,
            state,
        ),
        None => Err(BuiltinError::no_such_method(receiver, name).into()),
    }
}
