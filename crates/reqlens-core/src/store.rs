//! The shared aggregate store.
//!
//! `AggregateStore` is the only shared mutable resource in the
//! collector. A single `RwLock` guards all of its aggregate state, so a
//! commit is atomic (a reader never observes a count without the min/max
//! and ring-buffer contents it is derived from) and a snapshot reflects
//! every commit whose write lock was released before the snapshot
//! acquired the read lock.
//!
//! `commit` performs in-memory mutation only; no I/O ever happens under
//! the lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::record::RequestRecord;
use crate::ring::RecentRequestLog;
use crate::stats::{EndpointStats, GlobalStats};

/// Capacity knobs for the store's bounded structures.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Ring-buffer capacity for the recent-request log.
    pub history_capacity: usize,
    /// Sample-window capacity for each percentile estimator.
    pub sample_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            sample_capacity: 1000,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StoreInner {
    pub(crate) global: GlobalStats,
    pub(crate) endpoints: HashMap<String, EndpointStats>,
    pub(crate) recent: RecentRequestLog,
    sample_capacity: usize,
}

/// Owner of all aggregate state. Mutated only through `commit`; read
/// only through `QueryService`.
#[derive(Debug)]
pub struct AggregateStore {
    inner: RwLock<StoreInner>,
    uptime_start: SystemTime,
    dropped_records: AtomicU64,
}

impl AggregateStore {
    pub fn new(cfg: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                global: GlobalStats::new(cfg.sample_capacity),
                endpoints: HashMap::new(),
                recent: RecentRequestLog::new(cfg.history_capacity),
                sample_capacity: cfg.sample_capacity,
            }),
            uptime_start: SystemTime::now(),
            dropped_records: AtomicU64::new(0),
        }
    }

    /// Fold one record into every aggregate under a single write lock:
    /// global stats, the (lazily created) endpoint entry, and the
    /// recent-request log.
    pub fn commit(&self, record: RequestRecord) {
        let mut inner = self.write();
        inner.global.apply(&record);
        let sample_capacity = inner.sample_capacity;
        inner
            .endpoints
            .entry(record.endpoint.clone())
            .or_insert_with(|| EndpointStats::new(sample_capacity))
            .apply(&record);
        inner.recent.push(record);
    }

    /// Set once at construction; reads do not touch the lock.
    pub fn uptime_start(&self) -> SystemTime {
        self.uptime_start
    }

    /// Records the recorder refused to commit (malformed input).
    pub fn dropped_records(&self) -> u64 {
        self.dropped_records.load(Ordering::Relaxed)
    }

    pub(crate) fn note_dropped(&self) {
        self.dropped_records.fetch_add(1, Ordering::Relaxed);
    }

    // A poisoned lock means a writer panicked mid-commit; the aggregates
    // are still structurally valid, so recover rather than propagate.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rec(endpoint: &str, status: u16, duration: f64) -> RequestRecord {
        RequestRecord::new(endpoint, "GET", status, duration, None).unwrap()
    }

    #[test]
    fn per_endpoint_counts_match_commits() {
        let store = AggregateStore::new(StoreConfig::default());
        for _ in 0..4 {
            store.commit(rec("/a", 200, 1.0));
        }
        for _ in 0..3 {
            store.commit(rec("/b", 200, 1.0));
        }
        let inner = store.read();
        assert_eq!(inner.global.stats.count, 7);
        assert_eq!(inner.endpoints["/a"].count, 4);
        assert_eq!(inner.endpoints["/b"].count, 3);
    }

    #[test]
    fn endpoint_entries_are_created_lazily() {
        let store = AggregateStore::new(StoreConfig::default());
        assert!(store.read().endpoints.is_empty());
        store.commit(rec("/a", 200, 1.0));
        assert_eq!(store.read().endpoints.len(), 1);
    }

    #[test]
    fn all_server_errors_give_unit_error_rate() {
        let store = AggregateStore::new(StoreConfig::default());
        for _ in 0..5 {
            store.commit(rec("/test/error", 500, 3.0));
        }
        let inner = store.read();
        assert_eq!(inner.global.stats.error_count, 5);
        assert_eq!(inner.global.stats.error_rate(), 1.0);
        assert_eq!(inner.global.error_type_counts["server_error"], 5);
    }

    #[test]
    fn recent_log_is_bounded_by_config() {
        let store = AggregateStore::new(StoreConfig {
            history_capacity: 8,
            sample_capacity: 8,
        });
        for i in 0..20u16 {
            store.commit(rec("/a", 200, f64::from(i)));
        }
        let inner = store.read();
        assert_eq!(inner.recent.len(), 8);
        let first = inner.recent.iter().next().unwrap().duration_ms;
        assert_eq!(first, 12.0);
    }
}
