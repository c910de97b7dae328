//! Read-only snapshots of aggregate state.
//!
//! `QueryService` holds no state of its own; every call reads the store
//! under its read lock and returns an owned, consistent copy. `health`
//! deliberately touches no lock at all so it stays cheap under write
//! contention.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::record::RequestRecord;
use crate::report::DigestReport;
use crate::stats::{uptime_seconds, EndpointStats};
use crate::store::AggregateStore;

/// Latency percentiles in milliseconds. Fields are 0.0 when no samples
/// have been retained yet.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct Percentiles {
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

impl Percentiles {
    fn of(stats: &EndpointStats) -> Self {
        Self {
            p50: stats.estimator.quantile(0.50).unwrap_or(0.0),
            p90: stats.estimator.quantile(0.90).unwrap_or(0.0),
            p99: stats.estimator.quantile(0.99).unwrap_or(0.0),
        }
    }
}

/// Read-only view of one endpoint's aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointView {
    pub count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub avg_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub percentiles: Percentiles,
}

impl EndpointView {
    fn of(stats: &EndpointStats) -> Self {
        Self {
            count: stats.count,
            error_count: stats.error_count,
            error_rate: stats.error_rate(),
            avg_duration_ms: stats.avg_duration_ms(),
            min_duration_ms: stats.min_duration_ms,
            max_duration_ms: stats.max_duration_ms,
            percentiles: Percentiles::of(stats),
        }
    }
}

/// Read-only view of the process-wide aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalView {
    pub uptime_seconds: f64,
    pub total_requests: u64,
    pub total_errors: u64,
    pub error_rate: f64,
    pub requests_per_second: f64,
    pub avg_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub percentiles: Percentiles,
    pub status_codes: BTreeMap<u16, u64>,
    pub methods: BTreeMap<String, u64>,
    pub error_types: BTreeMap<String, u64>,
    /// Malformed records the recorder refused to commit.
    pub dropped_records: u64,
}

/// Consistent point-in-time copy of everything the query surface serves.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub global: GlobalView,
    pub endpoints: BTreeMap<String, EndpointView>,
    /// Recent-log contents, oldest first.
    pub recent: Vec<RequestRecord>,
}

/// Fixed-shape liveness answer, independent of metrics volume.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub uptime_seconds: f64,
}

/// Read side of the collector.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<AggregateStore>,
}

impl QueryService {
    pub fn new(store: Arc<AggregateStore>) -> Self {
        Self { store }
    }

    /// Full snapshot under one read-lock acquisition: a count is never
    /// reported without the min/max, percentile window, and ring-buffer
    /// contents it was derived from.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.store.read();
        StatsSnapshot {
            global: self.global_view(&inner),
            endpoints: inner
                .endpoints
                .iter()
                .map(|(name, stats)| (name.clone(), EndpointView::of(stats)))
                .collect(),
            recent: inner.recent.iter().cloned().collect(),
        }
    }

    /// Global aggregates only.
    pub fn global(&self) -> GlobalView {
        let inner = self.store.read();
        self.global_view(&inner)
    }

    /// Per-endpoint views only.
    pub fn endpoints(&self) -> BTreeMap<String, EndpointView> {
        let inner = self.store.read();
        inner
            .endpoints
            .iter()
            .map(|(name, stats)| (name.clone(), EndpointView::of(stats)))
            .collect()
    }

    /// The most recent `limit` records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<RequestRecord> {
        self.store.read().recent.recent(limit)
    }

    /// Liveness only. Reads an immutable field and an atomic; never
    /// contends with the store lock.
    pub fn health(&self) -> Health {
        Health {
            status: "ok",
            uptime_seconds: uptime_seconds(self.store.uptime_start()),
        }
    }

    /// Error rate over records whose completion time falls inside the
    /// trailing `window`, computed from the recent log. Empty window
    /// reads as 0.0.
    pub fn error_rate_within(&self, window: Duration) -> f64 {
        let cutoff = SystemTime::now().checked_sub(window);
        let inner = self.store.read();
        let mut total = 0u64;
        let mut errors = 0u64;
        for rec in inner.recent.iter() {
            if in_window(rec, cutoff) {
                total += 1;
                if rec.is_error() {
                    errors += 1;
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64
        }
    }

    /// Mean duration over the trailing `window`, from the recent log.
    pub fn avg_duration_within(&self, window: Duration) -> f64 {
        let cutoff = SystemTime::now().checked_sub(window);
        let inner = self.store.read();
        let mut total = 0u64;
        let mut sum = 0.0;
        for rec in inner.recent.iter() {
            if in_window(rec, cutoff) {
                total += 1;
                sum += rec.duration_ms;
            }
        }
        if total == 0 {
            0.0
        } else {
            sum / total as f64
        }
    }

    /// Digest report over `[start, end]`, built from the recent log.
    pub fn digest(&self, start: SystemTime, end: SystemTime) -> DigestReport {
        let inner = self.store.read();
        let in_range: Vec<&RequestRecord> = inner
            .recent
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .collect();
        DigestReport::build(&in_range, start, end)
    }

    fn global_view(&self, inner: &crate::store::StoreInner) -> GlobalView {
        let uptime = uptime_seconds(self.store.uptime_start());
        let stats = &inner.global.stats;
        GlobalView {
            uptime_seconds: uptime,
            total_requests: stats.count,
            total_errors: stats.error_count,
            error_rate: stats.error_rate(),
            requests_per_second: if uptime > 0.0 {
                stats.count as f64 / uptime
            } else {
                0.0
            },
            avg_duration_ms: stats.avg_duration_ms(),
            min_duration_ms: stats.min_duration_ms,
            max_duration_ms: stats.max_duration_ms,
            percentiles: Percentiles::of(stats),
            status_codes: inner.global.status_code_counts.iter().map(|(k, v)| (*k, *v)).collect(),
            methods: inner
                .global
                .method_counts
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            error_types: inner
                .global
                .error_type_counts
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            dropped_records: self.store.dropped_records(),
        }
    }
}

fn in_window(rec: &RequestRecord, cutoff: Option<SystemTime>) -> bool {
    match cutoff {
        Some(cutoff) => rec.timestamp >= cutoff,
        // window longer than the process has existed
        None => true,
    }
}
