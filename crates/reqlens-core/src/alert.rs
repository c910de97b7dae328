//! Outbound alert boundary.
//!
//! The collector classifies some failures as alert-worthy and hands them
//! to an `AlertHandler`. Handlers must only enqueue: the call happens on
//! the request path (after the commit, outside the store lock) and must
//! never block or fail the request it instruments. Actual delivery to
//! external channels belongs to the host, not the core.

use serde::Serialize;

use crate::record::{unix_seconds, ErrorKind, RequestRecord};

/// Classified alert event emitted once per alert-worthy request.
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    /// Stable error-kind label, e.g. `server_error`.
    pub error_kind: String,
    /// Completion time, seconds since the unix epoch.
    pub timestamp: f64,
    pub message: Option<String>,
}

impl AlertEvent {
    /// Build the event for a record whose error kind is alert-worthy.
    /// Returns `None` for successes and plain client errors.
    pub fn from_record(record: &RequestRecord) -> Option<Self> {
        let kind = record.error_kind.as_ref().filter(|k| k.alert_worthy())?;
        Some(Self {
            endpoint: record.endpoint.clone(),
            method: record.method.clone(),
            status_code: record.status_code,
            error_kind: kind.label(),
            timestamp: unix_seconds(record.timestamp),
            message: Some(match kind {
                ErrorKind::HandledException(ty) => {
                    format!("handled {ty} on {} {}", record.method, record.endpoint)
                }
                _ => format!(
                    "{} {} returned {}",
                    record.method, record.endpoint, record.status_code
                ),
            }),
        })
    }

}

/// Fire-and-forget hook the recorder hands alert events to. Must be
/// non-blocking; implementations typically push onto a channel drained
/// by an async worker.
pub trait AlertHandler: Send + Sync {
    fn alert(&self, event: AlertEvent);
}
