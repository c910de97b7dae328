//! Bounded-memory latency quantile estimation.
//!
//! Exact percentiles over the full request history would need O(total
//! requests) memory; the estimator instead retains a fixed window of the
//! most recent K samples and answers quantile queries against that
//! window. Replacement policy: sliding window — when the window is full,
//! observing a new sample displaces the oldest one. This is
//! deterministic, so estimates are reproducible for a given input
//! sequence (unlike random reservoir sampling).

use std::collections::VecDeque;

/// Fixed-window quantile estimator. Memory is O(capacity) regardless of
/// how many samples have been observed.
#[derive(Debug, Clone)]
pub struct PercentileEstimator {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl PercentileEstimator {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a sample, displacing the oldest retained one when full.
    pub fn observe(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// The q-th order statistic of the retained window, q in [0, 1]
    /// (values outside are clamped). Linear interpolation between ranks
    /// at `q * (n - 1)`. Returns `None` when no samples are retained.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let q = q.clamp(0.0, 1.0);
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let rank = q * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        if lo == hi {
            return Some(sorted[lo]);
        }
        let frac = rank - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
