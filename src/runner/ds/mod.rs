//! Runtime data structures shared by the dispatcher and the bridge.

pub mod error;
pub mod execution_context;
pub mod function_object;
pub mod state;
pub mod value;
