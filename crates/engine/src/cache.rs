//! First-page result cache
//!
//! Caches the first page of a request keyed by its signature and page size.
//! Entries expire after a TTL read from an injected [`Clock`] and are dropped
//! for a whole scope whenever a record of that scope is written. Only first
//! pages are cached; `load_more` always goes to the store.
//!
//! Every scope carries a generation that [`ResultCache::invalidate_scope`]
//! bumps. A caller reads it with [`ResultCache::generation`] before querying
//! the store and hands it back to [`ResultCache::insert`]; a page fetched
//! across an invalidation is dropped instead of cached. Expired entries are
//! swept on every insert.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use recdex_core::ScopeId;
use tracing::debug;

use crate::clock::Clock;
use crate::search::{PageResult, Signature};

struct CacheEntry {
    scope: ScopeId,
    page: PageResult,
    stored_at_ms: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<(Signature, usize), CacheEntry>,
    generations: HashMap<ScopeId, u64>,
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that missed or found an expired entry
    pub misses: u64,
    /// Entries held, expired ones included until the next insert sweeps them
    pub entries: usize,
}

/// TTL cache of first pages
pub struct ResultCache {
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("ttl_ms", &self.ttl_ms)
            .field("entries", &self.state.read().entries.len())
            .finish_non_exhaustive()
    }
}

impl ResultCache {
    /// Cache with entry lifetime `ttl`; a zero TTL disables caching
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        ResultCache {
            ttl_ms: ttl.as_millis() as u64,
            clock,
            state: RwLock::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Whether entries are kept at all
    pub fn is_enabled(&self) -> bool {
        self.ttl_ms > 0
    }

    /// Cached first page, if present and not expired
    pub fn get(&self, signature: &Signature, page_size: usize) -> Option<PageResult> {
        if !self.is_enabled() {
            return None;
        }
        let key = (signature.clone(), page_size);
        let now = self.clock.now_millis();
        {
            let state = self.state.read();
            if let Some(entry) = state.entries.get(&key) {
                if now.saturating_sub(entry.stored_at_ms) < self.ttl_ms {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.page.clone());
                }
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }
        self.state.write().entries.remove(&key);
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(target: "recdex::search", signature = %signature, "Cached page expired");
        None
    }

    /// Current generation of `scope`; read it before querying the store
    pub fn generation(&self, scope: &ScopeId) -> u64 {
        self.state
            .read()
            .generations
            .get(scope)
            .copied()
            .unwrap_or(0)
    }

    /// Store a first page fetched while `scope` was at `generation`.
    ///
    /// Returns `false` and keeps nothing if the scope was invalidated since.
    pub fn insert(
        &self,
        scope: &ScopeId,
        generation: u64,
        page_size: usize,
        page: PageResult,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let now = self.clock.now_millis();
        let mut state = self.state.write();
        let current = state.generations.get(scope).copied().unwrap_or(0);
        if current != generation {
            debug!(
                target: "recdex::search",
                scope = %scope,
                generation,
                current,
                "Dropped page fetched across a write"
            );
            return false;
        }

        let ttl_ms = self.ttl_ms;
        let before = state.entries.len();
        state
            .entries
            .retain(|_, e| now.saturating_sub(e.stored_at_ms) < ttl_ms);
        let swept = before - state.entries.len();
        if swept > 0 {
            debug!(target: "recdex::search", swept, "Swept expired pages");
        }

        let entry = CacheEntry {
            scope: scope.clone(),
            stored_at_ms: now,
            page,
        };
        state
            .entries
            .insert((entry.page.signature.clone(), page_size), entry);
        true
    }

    /// Drop every entry of `scope` and bump its generation; returns how many
    /// entries were dropped
    pub fn invalidate_scope(&self, scope: &ScopeId) -> usize {
        let mut state = self.state.write();
        *state.generations.entry(scope.clone()).or_insert(0) += 1;
        let before = state.entries.len();
        state.entries.retain(|_, e| &e.scope != scope);
        let dropped = before - state.entries.len();
        if dropped > 0 {
            debug!(target: "recdex::search", scope = %scope, dropped, "Invalidated cached pages");
        }
        dropped
    }

    /// Drop everything
    pub fn clear(&self) {
        self.state.write().entries.clear();
    }

    /// Counters snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.state.read().entries.len(),
        }
    }
}
