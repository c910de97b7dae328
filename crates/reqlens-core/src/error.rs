//! Shared error type across reqlens crates.

use thiserror::Error;

/// Stable error codes surfaced in API responses and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed instrumentation input (bad status code, negative duration, ...).
    InvalidRecord,
    /// Configuration rejected.
    BadConfig,
    /// Unsupported config schema version.
    UnsupportedVersion,
    /// Internal collector error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRecord => "INVALID_RECORD",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ReqLensError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ReqLensError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ReqLensError {
    /// Map internal error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReqLensError::InvalidRecord(_) => ErrorCode::InvalidRecord,
            ReqLensError::BadConfig(_) => ErrorCode::BadConfig,
            ReqLensError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ReqLensError::Internal(_) => ErrorCode::Internal,
        }
    }
}
