//! Builtin methods.
//!
//! These are dispatch targets only: each module registers the methods of
//! one builtin type into its resolver table.

pub mod any;
pub mod array;
pub mod boolean;
pub mod core;
pub mod error;
pub mod function;
pub mod number;
pub mod state;
pub mod text;

pub use self::core::register_core_builtins;
