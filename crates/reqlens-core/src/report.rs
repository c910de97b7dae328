//! Digest reports over a time range of the recent log.
//!
//! A digest summarizes traffic between two points in time: totals, error
//! breakdown, status-code distribution, and the busiest endpoints.
//! Rendering and delivery (dashboard, scheduled email) are the host's
//! concern; the core only aggregates.

use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;

use crate::record::{unix_seconds, RequestRecord};

/// At most this many endpoints appear in `top_endpoints`.
const TOP_ENDPOINTS: usize = 10;

/// Per-endpoint line in a digest, ordered by request count.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDigest {
    pub endpoint: String,
    pub count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub avg_duration_ms: f64,
}

/// Aggregated view of a time range.
#[derive(Debug, Clone, Serialize)]
pub struct DigestReport {
    /// Range bounds, seconds since the unix epoch.
    pub start: f64,
    pub end: f64,
    pub total_requests: u64,
    pub total_errors: u64,
    pub error_rate: f64,
    pub avg_duration_ms: f64,
    /// Busiest endpoints first, at most ten.
    pub top_endpoints: Vec<EndpointDigest>,
    pub error_breakdown: HashMap<String, u64>,
    pub status_codes: HashMap<u16, u64>,
    /// Requests per UTC hour of day, 0-23.
    pub hourly_distribution: BTreeMap<u32, u64>,
    /// Requests per weekday, 0 = Monday.
    pub daily_distribution: BTreeMap<u32, u64>,
}

impl DigestReport {
    /// Aggregate the given records (already filtered to the range).
    pub fn build(records: &[&RequestRecord], start: SystemTime, end: SystemTime) -> Self {
        let total_requests = records.len() as u64;
        let total_errors = records.iter().filter(|r| r.is_error()).count() as u64;
        let avg_duration_ms = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.duration_ms).sum::<f64>() / records.len() as f64
        };

        struct Acc {
            count: u64,
            errors: u64,
            total_ms: f64,
        }
        let mut per_endpoint: HashMap<&str, Acc> = HashMap::new();
        let mut error_breakdown: HashMap<String, u64> = HashMap::new();
        let mut status_codes: HashMap<u16, u64> = HashMap::new();
        let mut hourly_distribution: BTreeMap<u32, u64> = BTreeMap::new();
        let mut daily_distribution: BTreeMap<u32, u64> = BTreeMap::new();

        for rec in records {
            let at: DateTime<Utc> = rec.timestamp.into();
            *hourly_distribution.entry(at.hour()).or_insert(0) += 1;
            *daily_distribution
                .entry(at.weekday().num_days_from_monday())
                .or_insert(0) += 1;
            let acc = per_endpoint.entry(rec.endpoint.as_str()).or_insert(Acc {
                count: 0,
                errors: 0,
                total_ms: 0.0,
            });
            acc.count += 1;
            acc.total_ms += rec.duration_ms;
            if rec.is_error() {
                acc.errors += 1;
            }
            if let Some(kind) = &rec.error_kind {
                *error_breakdown.entry(kind.label()).or_insert(0) += 1;
            }
            *status_codes.entry(rec.status_code).or_insert(0) += 1;
        }

        let mut top_endpoints: Vec<EndpointDigest> = per_endpoint
            .into_iter()
            .map(|(endpoint, acc)| EndpointDigest {
                endpoint: endpoint.to_string(),
                count: acc.count,
                error_count: acc.errors,
                error_rate: acc.errors as f64 / acc.count as f64,
                avg_duration_ms: acc.total_ms / acc.count as f64,
            })
            .collect();
        top_endpoints.sort_by(|a, b| b.count.cmp(&a.count).then(a.endpoint.cmp(&b.endpoint)));
        top_endpoints.truncate(TOP_ENDPOINTS);

        Self {
            start: unix_seconds(start),
            end: unix_seconds(end),
            total_requests,
            total_errors,
            error_rate: if total_requests == 0 {
                0.0
            } else {
                total_errors as f64 / total_requests as f64
            },
            avg_duration_ms,
            top_endpoints,
            error_breakdown,
            status_codes,
            hourly_distribution,
            daily_distribution,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rec(endpoint: &str, status: u16, duration: f64) -> RequestRecord {
        RequestRecord::new(endpoint, "GET", status, duration, None).unwrap()
    }

    fn range() -> (SystemTime, SystemTime) {
        let now = SystemTime::now();
        (now - Duration::from_secs(60), now + Duration::from_secs(60))
    }

    #[test]
    fn empty_range_is_all_zero() {
        let (start, end) = range();
        let report = DigestReport::build(&[], start, end);
        assert_eq!(report.total_requests, 0);
        assert_eq!(report.error_rate, 0.0);
        assert!(report.top_endpoints.is_empty());
    }

    #[test]
    fn aggregates_per_endpoint_and_orders_by_count() {
        let records = vec![
            rec("/a", 200, 1.0),
            rec("/a", 500, 3.0),
            rec("/a", 200, 2.0),
            rec("/b", 200, 10.0),
        ];
        let refs: Vec<&RequestRecord> = records.iter().collect();
        let (start, end) = range();
        let report = DigestReport::build(&refs, start, end);

        assert_eq!(report.total_requests, 4);
        assert_eq!(report.total_errors, 1);
        assert_eq!(report.top_endpoints[0].endpoint, "/a");
        assert_eq!(report.top_endpoints[0].count, 3);
        assert_eq!(report.top_endpoints[0].avg_duration_ms, 2.0);
        assert_eq!(report.top_endpoints[1].endpoint, "/b");
        assert_eq!(report.error_breakdown["server_error"], 1);
        assert_eq!(report.status_codes[&200], 3);
    }

    #[test]
    fn distributions_bucket_by_hour_and_weekday() {
        let records = vec![rec("/a", 200, 1.0), rec("/b", 200, 2.0), rec("/a", 500, 3.0)];
        let refs: Vec<&RequestRecord> = records.iter().collect();
        let (start, end) = range();
        let report = DigestReport::build(&refs, start, end);

        assert_eq!(report.hourly_distribution.values().sum::<u64>(), 3);
        assert_eq!(report.daily_distribution.values().sum::<u64>(), 3);
        assert!(report.hourly_distribution.keys().all(|h| *h < 24));
        assert!(report.daily_distribution.keys().all(|d| *d < 7));
    }

    #[test]
    fn caps_top_endpoints_at_ten() {
        let records: Vec<RequestRecord> = (0..15)
            .map(|i| rec(&format!("/ep/{i}"), 200, 1.0))
            .collect();
        let refs: Vec<&RequestRecord> = records.iter().collect();
        let (start, end) = range();
        let report = DigestReport::build(&refs, start, end);
        assert_eq!(report.top_endpoints.len(), 10);
        assert_eq!(report.total_requests, 15);
    }
}
