//! Runtime counters for diagnostics and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live counters. Increments are relaxed — they feed diagnostics, not
/// control flow.
#[derive(Debug, Default)]
pub(crate) struct Stats {
    applied: AtomicU64,
    cache_hits: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    setup_failures: AtomicU64,
    missing: AtomicU64,
    in_flight: AtomicU64,
}

impl Stats {
    pub(crate) fn record_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load_started(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_setup_failure(&self) {
        self.setup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_missing(&self) {
        self.missing.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            applied: self.applied.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            setup_failures: self.setup_failures.load(Ordering::Relaxed),
            missing: self.missing.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

/// A read-only snapshot of the runtime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Behavior setups that completed and were recorded.
    pub applied: u64,
    /// Resolves served from the cache (including joins of an in-flight
    /// load).
    pub cache_hits: u64,
    /// Loader invocations started.
    pub loads: u64,
    /// Loader invocations that failed (entry cleared for retry).
    pub load_failures: u64,
    /// Setup entry points that raised (pair left unapplied).
    pub setup_failures: u64,
    /// Injections that named an unregistered behavior.
    pub missing: u64,
    /// Loader invocations currently running.
    pub in_flight: u64,
}

impl StatsSnapshot {
    /// All failure classes combined.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.load_failures + self.setup_failures + self.missing
    }
}
