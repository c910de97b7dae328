//! Per-request observation model.
//!
//! A `RequestRecord` is built exactly once per completed request, at the
//! point control returns to the host framework. It is immutable after
//! construction; every aggregate in the store is derived from committed
//! records and nothing else.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{ReqLensError, Result};

/// Classification of a failed request.
///
/// `classify` is total over the error space: every status code >= 400
/// maps to some kind, every status below 400 (without a handled fault)
/// maps to none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 4xx response.
    ClientError,
    /// 5xx response, including 500s synthesized from unhandled faults.
    ServerError,
    /// The framework caught a specific error type and mapped it to a response.
    HandledException(String),
}

impl ErrorKind {
    /// Derive the kind from the final status code and an optional
    /// handled-fault type name supplied by the framework. A handled
    /// fault refines the classification only when the response is an
    /// error; a handler that recovers and returns a success status
    /// produced no observable error.
    pub fn classify(status_code: u16, handled_fault: Option<&str>) -> Option<Self> {
        if status_code < 400 {
            return None;
        }
        if let Some(ty) = handled_fault {
            return Some(ErrorKind::HandledException(ty.to_string()));
        }
        match status_code {
            500..=599 => Some(ErrorKind::ServerError),
            _ => Some(ErrorKind::ClientError),
        }
    }

    /// Stable label used in count maps, alerts, and JSON output.
    pub fn label(&self) -> String {
        match self {
            ErrorKind::ClientError => "client_error".to_string(),
            ErrorKind::ServerError => "server_error".to_string(),
            ErrorKind::HandledException(ty) => format!("handled_exception:{ty}"),
        }
    }

    /// Server-side failures are alert-worthy; plain 4xx noise is not.
    pub fn alert_worthy(&self) -> bool {
        !matches!(self, ErrorKind::ClientError)
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Immutable per-request observation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    /// Elapsed wall time in milliseconds, dispatch start to completion.
    pub duration_ms: f64,
    /// Completion time.
    pub timestamp: SystemTime,
    /// Present iff `status_code >= 400` or a handled fault occurred.
    pub error_kind: Option<ErrorKind>,
}

impl RequestRecord {
    /// Validate inputs and build a record, deriving `error_kind` from
    /// the status code and optional handled-fault type.
    pub fn new(
        endpoint: impl Into<String>,
        method: impl Into<String>,
        status_code: u16,
        duration_ms: f64,
        handled_fault: Option<&str>,
    ) -> Result<Self> {
        if !(100..=599).contains(&status_code) {
            return Err(ReqLensError::InvalidRecord(format!(
                "status_code out of range: {status_code}"
            )));
        }
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(ReqLensError::InvalidRecord(format!(
                "duration_ms must be finite and non-negative: {duration_ms}"
            )));
        }
        Ok(Self {
            endpoint: endpoint.into(),
            method: method.into(),
            status_code,
            duration_ms,
            timestamp: SystemTime::now(),
            error_kind: ErrorKind::classify(status_code, handled_fault),
        })
    }

    pub fn is_error(&self) -> bool {
        self.error_kind.is_some()
    }
}

/// Seconds since the unix epoch as f64. Pre-epoch clocks read as 0.
pub fn unix_seconds(t: SystemTime) -> f64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl Serialize for RequestRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RequestRecord", 6)?;
        s.serialize_field("endpoint", &self.endpoint)?;
        s.serialize_field("method", &self.method)?;
        s.serialize_field("status_code", &self.status_code)?;
        s.serialize_field("duration_ms", &self.duration_ms)?;
        s.serialize_field("timestamp", &unix_seconds(self.timestamp))?;
        s.serialize_field("error_kind", &self.error_kind)?;
        s.end()
    }
}
