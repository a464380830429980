//! Bounded polymorphic inline cache attached to a call site.

use tracing::{debug, trace};

use crate::runner::ds::function_object::Function;
use crate::runner::plugin::resolver::DispatchKey;

/// Outcome of resolving a method name for one dispatch key.
#[derive(Clone, Debug)]
pub enum Target {
    Method(Function),
    /// Propagated error receiving an unrelated method: return it unchanged.
    Absorb,
    Missing,
}

struct CacheEntry {
    key: DispatchKey,
    epoch: u64,
    target: Target,
}

pub struct InlineCache {
    entries: Vec<CacheEntry>,
    limit: usize,
    megamorphic: bool,
    hits: u64,
    misses: u64,
}

impl InlineCache {
    pub fn new(limit: usize) -> Self {
        InlineCache {
            entries: Vec::with_capacity(limit),
            limit: limit.max(1),
            megamorphic: false,
            hits: 0,
            misses: 0,
        }
    }

    /// Entries filled at an older registry epoch are dropped, never used.
    pub fn lookup(&mut self, key: &DispatchKey, epoch: u64) -> Option<Target> {
        if self.megamorphic {
            self.misses += 1;
            return None;
        }
        if let Some(pos) = self.entries.iter().position(|e| e.key == *key) {
            if self.entries[pos].epoch == epoch {
                self.hits += 1;
                trace!(?key, "inline cache hit");
                return Some(self.entries[pos].target.clone());
            }
            self.entries.remove(pos);
        }
        self.misses += 1;
        None
    }

    pub fn insert(&mut self, key: DispatchKey, epoch: u64, target: Target) {
        if self.megamorphic {
            return;
        }
        if self.entries.len() >= self.limit {
            debug!(limit = self.limit, "call site went megamorphic");
            self.entries.clear();
            self.megamorphic = true;
            return;
        }
        debug!(?key, epoch, "inline cache fill");
        self.entries.push(CacheEntry { key, epoch, target });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_megamorphic(&self) -> bool {
        self.megamorphic
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
