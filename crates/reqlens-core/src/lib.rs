//! reqlens core: the in-process request-metrics collector.
//!
//! This crate holds the collector's domain types and all shared mutable
//! state: per-request records, bounded latency estimators, the aggregate
//! store, the dispatch-path recorder hook, and the read-only query
//! surface. It intentionally carries no transport or runtime
//! dependencies so a host framework can embed it regardless of how it
//! serves traffic.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! The recorder sits on the hot path of every instrumented request; all
//! fallible paths must surface as `ReqLensError`/`Result` (or be
//! swallowed into a diagnostic counter) so the host process never
//! crashes because of its own instrumentation.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod alert;
pub mod error;
pub mod estimator;
pub mod query;
pub mod record;
pub mod recorder;
pub mod report;
pub mod ring;
pub mod stats;
pub mod store;

/// Shared result type.
pub use error::{ReqLensError, Result};

pub use alert::{AlertEvent, AlertHandler};
pub use estimator::PercentileEstimator;
pub use query::{Health, QueryService, StatsSnapshot};
pub use record::{ErrorKind, RequestRecord};
pub use recorder::EventRecorder;
pub use ring::RecentRequestLog;
pub use store::{AggregateStore, StoreConfig};
