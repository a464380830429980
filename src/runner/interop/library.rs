//! The interop protocol implemented once per value kind.
//!
//! Host values delegate to their [`InteropObject`](super::InteropObject),
//! proxies to the boundary proxy. Interpreter values answer from their own
//! representation and the method registry:
//! - atoms expose fields as readable members and resolvable methods as
//!   invocable members
//! - functions are executable
//! - constructors are instantiable
//! - arrays expose their elements
//!
//! Callbacks into interpreter code run with the state held by the
//! evaluation context, and store the updated state back.

use crate::runner::dispatch::{dispatch_positional, invoke_function};
use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::interop::InteropError;
use crate::runner::plugin::registry::TypeKey;
use crate::runner::plugin::resolver::{resolver_for, DispatchKey};
use crate::runner::plugin::types::EvalContext;

fn with_state(
    ctx: &mut EvalContext,
    f: impl FnOnce(&mut EvalContext, State) -> Result<Stateful, RuntimeError>,
) -> Result<Value, InteropError> {
    let state = ctx.interop_state();
    let Stateful { state, value } = f(ctx, state)?;
    ctx.set_interop_state(state);
    Ok(value)
}

fn reraise(value: &Value) -> Result<(), InteropError> {
    match value {
        Value::PanicSentinel(sentinel) => Err(InteropError::Raised(sentinel.reraise())),
        _ => Ok(()),
    }
}

fn own_table(value: &Value) -> Option<TypeKey> {
    match value {
        Value::Integer(_) => Some(TypeKey::Integer),
        Value::BigInteger(_) => Some(TypeKey::BigInteger),
        Value::Decimal(_) => Some(TypeKey::Decimal),
        Value::Boolean(_) => Some(TypeKey::Boolean),
        Value::Text(_) => Some(TypeKey::Text),
        Value::Function(_) => Some(TypeKey::Function),
        Value::Array(_) => Some(TypeKey::Array),
        Value::Error(_) => Some(TypeKey::Error),
        Value::Atom(atom) => Some(TypeKey::Atom(atom.constructor().id())),
        Value::Constructor(cons) => Some(TypeKey::Atom(cons.id())),
        Value::PanicSentinel(_) | Value::Host(_) | Value::Proxy(_) => None,
    }
}

pub fn is_null(ctx: &EvalContext, value: &Value) -> bool {
    match value {
        Value::Host(object) => object.is_null(ctx),
        Value::Proxy(proxy) => proxy.is_null(ctx),
        other => other.is_nothing(),
    }
}

pub fn members(ctx: &EvalContext, value: &Value) -> Vec<String> {
    match value {
        Value::Host(object) => object.members(ctx),
        Value::Proxy(proxy) => proxy.members(ctx),
        other => {
            let mut names: Vec<String> = match other {
                Value::Atom(atom) => atom
                    .constructor()
                    .fields()
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                _ => Vec::new(),
            };
            if let Some(key) = own_table(other) {
                names.extend(
                    ctx.registry()
                        .method_names(key)
                        .into_iter()
                        .map(str::to_string),
                );
            }
            names
        }
    }
}

pub fn has_members(ctx: &EvalContext, value: &Value) -> bool {
    match value {
        Value::Host(object) => object.has_members(ctx),
        Value::Proxy(proxy) => proxy.has_members(ctx),
        other => !members(ctx, other).is_empty(),
    }
}

pub fn is_member_invocable(ctx: &EvalContext, value: &Value, name: &str) -> bool {
    match value {
        Value::Host(object) => object.is_member_invocable(ctx, name),
        Value::Proxy(proxy) => proxy.is_member_invocable(ctx, name),
        Value::PanicSentinel(_) => false,
        other => {
            let key = DispatchKey::of(other);
            resolver_for(key.kind)
                .and_then(|resolve| resolve(ctx.registry(), &key, name))
                .is_some()
        }
    }
}

pub fn invoke_member(
    ctx: &mut EvalContext,
    value: &Value,
    name: &str,
    args: Vec<Value>,
) -> Result<Value, InteropError> {
    reraise(value)?;
    match value {
        Value::Host(object) => {
            let result = object.invoke_member(ctx, name, args)?;
            Ok(result.into_value(ctx.builtins()))
        }
        Value::Proxy(proxy) => proxy.invoke_member(ctx, name, args),
        other => {
            if !is_member_invocable(ctx, other, name) {
                return Err(InteropError::UnknownIdentifier(name.to_string()));
            }
            let receiver = other.clone();
            with_state(ctx, |ctx, state| {
                dispatch_positional(ctx, name, receiver, args, state)
            })
        }
    }
}

pub fn is_member_readable(ctx: &EvalContext, value: &Value, name: &str) -> bool {
    match value {
        Value::Host(object) => object.is_member_readable(ctx, name),
        Value::Proxy(proxy) => proxy.is_member_readable(ctx, name),
        Value::Atom(atom) => atom.field(name).is_some(),
        _ => false,
    }
}

pub fn read_member(ctx: &mut EvalContext, value: &Value, name: &str) -> Result<Value, InteropError> {
    reraise(value)?;
    match value {
        Value::Host(object) => {
            let result = object.read_member(ctx, name)?;
            Ok(result.into_value(ctx.builtins()))
        }
        Value::Proxy(proxy) => proxy.read_member(ctx, name),
        Value::Atom(atom) => atom
            .field(name)
            .cloned()
            .ok_or_else(|| InteropError::UnknownIdentifier(name.to_string())),
        _ => Err(InteropError::UnknownIdentifier(name.to_string())),
    }
}

pub fn is_executable(ctx: &EvalContext, value: &Value) -> bool {
    match value {
        Value::Host(object) => object.is_executable(ctx),
        Value::Proxy(proxy) => proxy.is_executable(ctx),
        Value::Function(_) => true,
        _ => false,
    }
}

pub fn execute(ctx: &mut EvalContext, value: &Value, args: Vec<Value>) -> Result<Value, InteropError> {
    reraise(value)?;
    match value {
        Value::Host(object) => {
            let result = object.execute(ctx, args)?;
            Ok(result.into_value(ctx.builtins()))
        }
        Value::Proxy(proxy) => proxy.execute(ctx, args),
        Value::Function(function) => {
            let function = function.clone();
            let defaults = ctx.config().dispatch.defaults;
            with_state(ctx, |ctx, state| {
                invoke_function(ctx, &function, args, &[], defaults, state)
            })
        }
        _ => Err(InteropError::UnsupportedMessage),
    }
}

pub fn is_instantiable(ctx: &EvalContext, value: &Value) -> bool {
    match value {
        Value::Host(object) => object.is_instantiable(ctx),
        Value::Constructor(_) => true,
        _ => false,
    }
}

pub fn instantiate(
    ctx: &mut EvalContext,
    value: &Value,
    args: Vec<Value>,
) -> Result<Value, InteropError> {
    reraise(value)?;
    match value {
        Value::Host(object) => {
            let result = object.instantiate(ctx, args)?;
            Ok(result.into_value(ctx.builtins()))
        }
        Value::Constructor(cons) => {
            let expected = cons.arity();
            let actual = args.len();
            cons.new_instance(args)
                .map_err(|_| InteropError::Arity { expected, actual })
        }
        _ => Err(InteropError::UnsupportedMessage),
    }
}

pub fn has_array_elements(ctx: &EvalContext, value: &Value) -> bool {
    match value {
        Value::Host(object) => object.has_array_elements(ctx),
        Value::Proxy(proxy) => proxy.has_array_elements(ctx),
        Value::Array(_) => true,
        _ => false,
    }
}

pub fn array_size(ctx: &EvalContext, value: &Value) -> Result<usize, InteropError> {
    match value {
        Value::Host(object) => object.array_size(ctx),
        Value::Proxy(proxy) => proxy.array_size(ctx),
        Value::Array(array) => Ok(array.len()),
        _ => Err(InteropError::UnsupportedMessage),
    }
}

pub fn read_array_element(
    ctx: &mut EvalContext,
    value: &Value,
    index: i64,
) -> Result<Value, InteropError> {
    match value {
        Value::Host(object) => {
            let result = object.read_array_element(ctx, index)?;
            Ok(result.into_value(ctx.builtins()))
        }
        Value::Proxy(proxy) => proxy.read_array_element(ctx, index),
        Value::Array(array) => array
            .get(index)
            .ok_or(InteropError::InvalidArrayIndex(index)),
        _ => Err(InteropError::UnsupportedMessage),
    }
}
