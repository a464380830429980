pub mod dispatch;
pub mod ds;
pub mod interop;
pub mod plugin;
pub mod polyglot;
pub mod std_lib;
