//! Deduplication cache for armed alerts
//!
//! Remembers which events already have an alert scheduled so that repeated
//! polls of the same calendar entry do not arm it twice. Shared between the
//! scheduler (lookup, weed) and the heartbeat monitor (clear), so every
//! operation takes the same lock.

use std::collections::HashMap;
use std::sync::Arc;

use meetbell_domain::{EventRecord, Fingerprint};
use parking_lot::Mutex;
use tracing::debug;

use crate::time::Clock;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<Fingerprint, EventRecord>,
    generation: u64,
}

/// Thread-safe set of fingerprints for events that already have an alert.
pub struct DedupCache {
    state: Mutex<CacheState>,
    clock: Arc<dyn Clock>,
}

impl DedupCache {
    /// Create an empty cache. `clock` decides which entries are expired.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { state: Mutex::new(CacheState::default()), clock }
    }

    /// Report whether `event` was already recorded, recording it if not.
    ///
    /// Check and insert happen under one lock, so of two concurrent lookups
    /// for the same fingerprint exactly one returns `false`.
    pub fn lookup(&self, event: &EventRecord) -> bool {
        let fingerprint = event.fingerprint();
        let mut state = self.state.lock();
        if state.entries.contains_key(&fingerprint) {
            return true;
        }
        debug!(event = %fingerprint, "dedup_cache_recorded");
        state.entries.insert(fingerprint, event.clone());
        false
    }

    /// Drop entries whose start time is not after the current time.
    ///
    /// Returns how many entries were removed.
    pub fn weed(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|fingerprint, _| fingerprint.start_time() > now);
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!(removed, remaining = state.entries.len(), "dedup_cache_weeded");
        }
        removed
    }

    /// Forget every entry and start a new generation.
    ///
    /// Returns how many entries were dropped.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        state.generation += 1;
        debug!(dropped, generation = state.generation, "dedup_cache_cleared");
        dropped
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// How many times the cache has been cleared.
    ///
    /// Armed alerts compare it on wake to spot a clear that happened while
    /// they slept.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }
}

impl std::fmt::Debug for DedupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DedupCache")
            .field("entries", &state.entries.len())
            .field("generation", &state.generation)
            .finish_non_exhaustive()
    }
}
