use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;
use uuid::Uuid;

use super::arguments::{ArgumentRole, DefaultsMode};
use super::cache::InlineCache;
use super::{dispatch, resolve_target, run_target};
use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::state::{State, Stateful};
use crate::runner::ds::value::Value;
use crate::runner::plugin::config::RuntimeConfig;
use crate::runner::plugin::resolver::DispatchKey;
use crate::runner::plugin::types::EvalContext;

const DEFAULT_CACHE_LIMIT: usize = 3;

/// One method-call expression: a fixed name and argument schema plus the
/// inline cache for the receivers it has seen.
pub struct CallSite {
    id: Uuid,
    name: Rc<str>,
    schema: Vec<ArgumentRole>,
    defaults: DefaultsMode,
    cache: RefCell<InlineCache>,
}

impl CallSite {
    /// `schema` describes the explicit arguments, not the receiver.
    pub fn new(name: &str, schema: Vec<ArgumentRole>) -> Self {
        CallSite {
            id: Uuid::new_v4(),
            name: Rc::from(name),
            schema,
            defaults: DefaultsMode::Execute,
            cache: RefCell::new(InlineCache::new(DEFAULT_CACHE_LIMIT)),
        }
    }

    pub fn for_config(name: &str, schema: Vec<ArgumentRole>, config: &RuntimeConfig) -> Self {
        CallSite::new(name, schema)
            .with_defaults_mode(config.dispatch.defaults)
            .with_cache_limit(config.dispatch.inline_cache_limit)
    }

    pub fn with_defaults_mode(mut self, defaults: DefaultsMode) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache = RefCell::new(InlineCache::new(limit));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(
        &self,
        ctx: &mut EvalContext,
        receiver: Value,
        args: Vec<Value>,
        state: State,
    ) -> Result<Stateful, RuntimeError> {
        match &receiver {
            Value::PanicSentinel(_) | Value::Host(_) | Value::Proxy(_) => {
                return dispatch(
                    ctx,
                    &self.name,
                    receiver,
                    args,
                    &self.schema,
                    self.defaults,
                    state,
                );
            }
            _ => {}
        }

        let key = DispatchKey::of(&receiver);
        let epoch = ctx.registry().epoch();
        let cached = self.cache.borrow_mut().lookup(&key, epoch);
        let target = match cached {
            Some(target) => target,
            None => {
                let target = resolve_target(ctx.registry(), &key, &self.name);
                trace!(site = %self.id, method = %self.name, ?key, "resolved");
                self.cache.borrow_mut().insert(key, epoch, target.clone());
                target
            }
        };
        run_target(
            ctx,
            target,
            &self.name,
            receiver,
            args,
            &self.schema,
            self.defaults,
            state,
        )
    }

    pub fn is_megamorphic(&self) -> bool {
        self.cache.borrow().is_megamorphic()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache.borrow().hits()
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache.borrow().misses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_site_hits_cache() {
        let mut ctx = EvalContext::new();
        let site = CallSite::new("+", vec![ArgumentRole::Positional]);
        for i in 0..3 {
            let r = site
                .call(&mut ctx, Value::Integer(i), vec![Value::Integer(1)], State::empty())
                .unwrap();
            assert_eq!(r.value, Value::Integer(i + 1));
        }
        assert_eq!(site.cache_misses(), 1);
        assert_eq!(site.cache_hits(), 2);
        assert_eq!(site.cached_entries(), 1);
    }

    #[test]
    fn test_megamorphic_site_still_dispatches() {
        let mut ctx = EvalContext::new();
        let site = CallSite::new("to_text", vec![]).with_cache_limit(1);
        let receivers = vec![Value::Integer(1), Value::Boolean(true), Value::text("t")];
        let texts: Vec<Value> = receivers
            .into_iter()
            .map(|r| site.call(&mut ctx, r, vec![], State::empty()).unwrap().value)
            .collect();
        assert!(site.is_megamorphic());
        assert_eq!(
            texts,
            vec![Value::text("1"), Value::text("True"), Value::text("t")]
        );
    }
}
