//! # vesper - method dispatch and polyglot bridging core
//!
//! The call-dispatch and cross-language value bridging core of a
//! dynamically-typed interpreter:
//! - Per-kind resolver tables and a dispatcher with bounded inline caches
//! - A host interop resolver for foreign (non-native) receivers
//! - A two-context bridge that evaluates embedded guest-language snippets
//! - Boundary proxies that keep values usable on the other side of the bridge
//!
//! ## Quick Start
//!
//! ### Dispatching a method call
//!
//! ```
//! use vesper::runner::dispatch::{ArgumentRole, CallSite};
//! use vesper::runner::ds::state::State;
//! use vesper::runner::ds::value::Value;
//! use vesper::runner::plugin::types::EvalContext;
//!
//! let mut ctx = EvalContext::new();
//! let site = CallSite::new("+", vec![ArgumentRole::Positional]);
//!
//! let result = site
//!     .call(&mut ctx, Value::Integer(40), vec![Value::Integer(2)], State::empty())
//!     .unwrap();
//! assert_eq!(result.value, Value::Integer(42));
//! ```
//!
//! ### Evaluating an embedded snippet
//!
//! ```
//! use vesper::runner::ds::state::State;
//! use vesper::runner::ds::value::Value;
//! use vesper::runner::plugin::types::EvalContext;
//! use vesper::runner::polyglot::ForeignEval;
//!
//! let mut ctx = EvalContext::new();
//! let eval = ForeignEval::new("calc", "x * 2 + 1", &["x"]);
//!
//! let result = eval
//!     .execute(&mut ctx, State::empty(), vec![Value::Integer(20)])
//!     .unwrap();
//! assert_eq!(result.value, Value::Integer(41));
//! assert!(eval.is_parsed());
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG parser and AST for the built-in `calc` guest language
//! - **[`runner`]** - Dispatch and bridging
//!   - **[`runner::ds`]** - Values, errors, state, functions, execution contexts
//!   - **[`runner::plugin`]** - Method registry, resolvers, evaluation context, config
//!   - **[`runner::dispatch`]** - Dispatcher, call sites, argument alignment
//!   - **[`runner::interop`]** - Interop protocol and the host interop resolver
//!   - **[`runner::polyglot`]** - Context bridge and boundary proxies
//!   - **[`runner::std_lib`]** - Builtin methods used as dispatch targets

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
