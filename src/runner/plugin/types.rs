//! Core types shared by builtins, resolvers and the bridge.

use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::config::RuntimeConfig;
use crate::runner::plugin::registry::MethodRegistry;
use crate::runner::polyglot::{GuestLanguage, Polyglot};
use crate::runner::std_lib::core::Builtins;

/// Everything an evaluation needs: resolver tables, builtin constructors,
/// the context bridge and the runtime configuration.
pub struct EvalContext {
    registry: MethodRegistry,
    builtins: Builtins,
    polyglot: Polyglot,
    config: RuntimeConfig,
    /// State threaded through interop callbacks while a host object or a
    /// guest snippet is running.
    interop_state: Option<State>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let builtins = Builtins::new();
        let registry = MethodRegistry::with_core(&builtins);
        let polyglot = Polyglot::new(&config.polyglot);
        EvalContext {
            registry,
            builtins,
            polyglot,
            config,
            interop_state: None,
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MethodRegistry {
        &mut self.registry
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn polyglot(&self) -> &Polyglot {
        &self.polyglot
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Installs an additional guest language.
    pub fn add_language(&mut self, language: Box<dyn GuestLanguage>) {
        self.polyglot.register(language);
    }

    /// Runs `f` with `state` available to interop callbacks and returns the
    /// state those callbacks left behind.
    pub fn with_interop_state<R>(
        &mut self,
        state: State,
        f: impl FnOnce(&mut EvalContext) -> R,
    ) -> (State, R) {
        let saved = self.interop_state.replace(state);
        let result = f(self);
        let threaded = std::mem::replace(&mut self.interop_state, saved).unwrap_or_default();
        (threaded, result)
    }

    /// The state an interop callback should start from.
    pub fn interop_state(&self) -> State {
        self.interop_state.clone().unwrap_or_default()
    }

    pub fn set_interop_state(&mut self, state: State) {
        if self.interop_state.is_some() {
            self.interop_state = Some(state);
        }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Signature of builtin methods that do not touch the state.
/// The receiver is the first argument.
pub type PureFn = fn(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Value, RuntimeError>;

/// Signature of builtin methods that read or update the state.
pub type StatefulFn =
    fn(ctx: &mut EvalContext, state: State, args: Vec<Value>) -> Result<Stateful, RuntimeError>;
