//! Bounded recent-request history.

use std::collections::VecDeque;

use crate::record::RequestRecord;

/// Fixed-capacity FIFO log of completed requests. On overflow the oldest
/// entry is evicted. Iteration order is insertion order, oldest first.
#[derive(Debug)]
pub struct RecentRequestLog {
    buf: VecDeque<RequestRecord>,
    capacity: usize,
}

impl RecentRequestLog {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: RequestRecord) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestRecord> {
        self.buf.iter()
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<RequestRecord> {
        let skip = self.buf.len().saturating_sub(limit);
        self.buf.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rec(endpoint: &str, n: u16) -> RequestRecord {
        RequestRecord::new(endpoint, "GET", 200, f64::from(n), None).unwrap()
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut log = RecentRequestLog::new(5);
        for i in 0..13u16 {
            log.push(rec("/a", i));
            assert!(log.len() <= 5);
        }
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn keeps_most_recent_in_insertion_order() {
        let mut log = RecentRequestLog::new(3);
        for i in 0..7u16 {
            log.push(rec("/a", i));
        }
        let kept: Vec<f64> = log.iter().map(|r| r.duration_ms).collect();
        assert_eq!(kept, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let mut log = RecentRequestLog::new(10);
        for i in 0..6u16 {
            log.push(rec("/a", i));
        }
        let tail: Vec<f64> = log.recent(2).iter().map(|r| r.duration_ms).collect();
        assert_eq!(tail, vec![4.0, 5.0]);
        // limit larger than contents returns everything
        assert_eq!(log.recent(100).len(), 6);
    }
}
