//! reqlens server library entry.
//!
//! This crate wires the core collector into an axum HTTP surface: the
//! instrumentation middleware (the host-framework hook), the read-only
//! monitoring endpoints, the notification worker, and the config layer.
//! It is consumed by the binary (`main.rs`), by integration tests, and
//! by hosts that merge the monitoring router into their own app.

pub mod app_state;
pub mod config;
pub mod middleware;
pub mod notify;
pub mod ops;
pub mod router;
