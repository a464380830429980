//! The context bridge for embedded guest-language snippets.
//!
//! Two execution contexts take part in every embedded evaluation: the host
//! context the call comes from and a single inner context, created lazily as
//! a child of the host, in which all guest code runs. Values crossing
//! between them are converted by [`convert`]: integers pass unchanged and
//! everything else travels as a [`BoundaryProxy`](proxy::BoundaryProxy) that
//! re-enters its owning context for each operation.

pub mod calc;
pub mod convert;
pub mod eval_site;
pub mod proxy;

pub use eval_site::ForeignEval;

use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::config::PolyglotConfig;
use crate::runner::plugin::types::EvalContext;

/// Language id of the interpreter itself.
pub const HOST_LANGUAGE: &str = "vesper";

lazy_static! {
    static ref DEFAULT_ALIASES: HashMap<&'static str, &'static str> = {
        let mut aliases = HashMap::new();
        aliases.insert("r", "R");
        aliases.insert("js", "javascript");
        aliases.insert("py", "python");
        aliases
    };
}

/// A parsed snippet, reusable across invocations.
pub trait CallTarget {
    /// `args` are already converted into the inner context.
    fn call(
        &self,
        ctx: &mut EvalContext,
        state: State,
        args: Vec<Value>,
    ) -> Result<Stateful, RuntimeError>;
}

/// A guest language able to turn snippet text into a call target.
pub trait GuestLanguage {
    fn id(&self) -> &str;

    fn parse(&self, source: &str, arg_names: &[Rc<str>]) -> Result<Rc<dyn CallTarget>, RuntimeError>;
}

pub struct Polyglot {
    host: ExecutionContext,
    inner: OnceCell<ExecutionContext>,
    languages: HashMap<String, Rc<dyn GuestLanguage>>,
    aliases: HashMap<String, String>,
    default_language: String,
}

impl Polyglot {
    pub fn new(config: &PolyglotConfig) -> Self {
        let mut aliases: HashMap<String, String> = DEFAULT_ALIASES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        aliases.extend(config.aliases.clone());
        let mut polyglot = Polyglot {
            host: ExecutionContext::root(HOST_LANGUAGE),
            inner: OnceCell::new(),
            languages: HashMap::new(),
            aliases,
            default_language: config.default_language.clone(),
        };
        polyglot.register(Box::new(calc::CalcLanguage));
        polyglot
    }

    pub fn register(&mut self, language: Box<dyn GuestLanguage>) {
        debug!(language = language.id(), "guest language installed");
        self.languages
            .insert(language.id().to_string(), Rc::from(language));
    }

    pub fn host(&self) -> &ExecutionContext {
        &self.host
    }

    /// The context guest code runs in. Created on first use.
    pub fn inner(&self) -> &ExecutionContext {
        self.inner.get_or_init(|| {
            debug!("creating inner polyglot context");
            self.host.child("polyglot")
        })
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn canonical_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.aliases.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn language(&self, id: &str) -> Result<Rc<dyn GuestLanguage>, RuntimeError> {
        self.languages
            .get(self.canonical_id(id))
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownLanguage(Rc::from(id)))
    }
}
