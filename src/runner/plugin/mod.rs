//! Method registry, per-kind resolvers and the evaluation context.
//!
//! Builtin methods live in resolver tables keyed by [`TypeKey`]. Each value
//! kind has a fixed lookup chain over those tables:
//!
//! ```text
//! Integer     -> Integer, Number, Any
//! BigInteger  -> BigInteger, Integer, Number, Any
//! Decimal     -> Decimal, Number, Any
//! Atom(c)     -> Atom(c), Any
//! Error       -> Error
//! Host, Proxy -> host interop resolver, then Any
//! ```
//!
//! ## Example: registering a method
//!
//! ```
//! use vesper::runner::dispatch::{ArgumentRole, CallSite};
//! use vesper::runner::ds::error::RuntimeError;
//! use vesper::runner::ds::state::State;
//! use vesper::runner::ds::value::Value;
//! use vesper::runner::plugin::registry::{BuiltInType, TypeKey};
//! use vesper::runner::plugin::types::EvalContext;
//!
//! fn shout(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
//!     Ok(Value::text(&args[0].to_string().to_uppercase()))
//! }
//!
//! let mut ctx = EvalContext::new();
//! ctx.registry_mut()
//!     .register_type(BuiltInType::new(TypeKey::Text).add_method("shout", &[], shout));
//!
//! let site = CallSite::new("shout", vec![]);
//! let result = site.call(&mut ctx, Value::text("hey"), vec![], State::empty()).unwrap();
//! assert_eq!(result.value, Value::text("HEY"));
//! ```

pub mod config;
pub mod registry;
pub mod resolver;
pub mod types;

pub use config::{ConfigError, RuntimeConfig};
pub use registry::{BuiltInType, MethodRegistry, TypeKey};
pub use resolver::{resolver_for, DispatchKey, ResolverFn};
pub use types::{EvalContext, PureFn, StatefulFn};
