//! Mutable aggregates maintained by the store.
//!
//! These types are only ever mutated under the store's write lock; they
//! carry no synchronization of their own.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::estimator::PercentileEstimator;
use crate::record::RequestRecord;

/// Rolling aggregate over one endpoint (or, embedded in `GlobalStats`,
/// over everything). Created lazily on the first request, never deleted.
///
/// `total_duration_ms` accumulates with plain floating-point summation;
/// drift over very long uptimes is a documented limitation.
#[derive(Debug)]
pub struct EndpointStats {
    pub count: u64,
    pub error_count: u64,
    pub total_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub estimator: PercentileEstimator,
}

impl EndpointStats {
    pub fn new(sample_capacity: usize) -> Self {
        Self {
            count: 0,
            error_count: 0,
            total_duration_ms: 0.0,
            min_duration_ms: 0.0,
            max_duration_ms: 0.0,
            estimator: PercentileEstimator::new(sample_capacity),
        }
    }

    /// Fold one record in. First sample initializes min/max; afterwards
    /// strict comparison, so ties keep the existing extremum.
    pub fn apply(&mut self, record: &RequestRecord) {
        self.count += 1;
        if record.is_error() {
            self.error_count += 1;
        }
        self.total_duration_ms += record.duration_ms;
        if self.count == 1 {
            self.min_duration_ms = record.duration_ms;
            self.max_duration_ms = record.duration_ms;
        } else {
            if record.duration_ms < self.min_duration_ms {
                self.min_duration_ms = record.duration_ms;
            }
            if record.duration_ms > self.max_duration_ms {
                self.max_duration_ms = record.duration_ms;
            }
        }
        self.estimator.observe(record.duration_ms);
    }

    pub fn avg_duration_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_duration_ms / self.count as f64
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.error_count as f64 / self.count as f64
        }
    }
}

/// Process-wide aggregate: the same rolling shape plus breakdowns by
/// status code, method, and error classification.
#[derive(Debug)]
pub struct GlobalStats {
    pub stats: EndpointStats,
    pub status_code_counts: HashMap<u16, u64>,
    pub method_counts: HashMap<String, u64>,
    pub error_type_counts: HashMap<String, u64>,
}

impl GlobalStats {
    pub fn new(sample_capacity: usize) -> Self {
        Self {
            stats: EndpointStats::new(sample_capacity),
            status_code_counts: HashMap::new(),
            method_counts: HashMap::new(),
            error_type_counts: HashMap::new(),
        }
    }

    pub fn apply(&mut self, record: &RequestRecord) {
        self.stats.apply(record);
        *self.status_code_counts.entry(record.status_code).or_insert(0) += 1;
        *self.method_counts.entry(record.method.clone()).or_insert(0) += 1;
        if let Some(kind) = &record.error_kind {
            *self.error_type_counts.entry(kind.label()).or_insert(0) += 1;
        }
    }
}

/// Seconds elapsed since `start`, saturating at 0 if the clock moved.
pub fn uptime_seconds(start: SystemTime) -> f64 {
    SystemTime::now()
        .duration_since(start)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
