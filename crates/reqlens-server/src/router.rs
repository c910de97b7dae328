//! Axum router wiring.
//!
//! Exposes the monitoring read surface and applies the instrumentation
//! middleware, so the monitoring endpoints themselves are observed like
//! any other route. Hosts embed the collector by merging their own
//! routes into this router (or vice versa) before serving.

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::{app_state::AppState, middleware, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/monitoring/stats", get(ops::stats))
        .route("/monitoring/requests", get(ops::requests))
        .route("/monitoring/endpoints", get(ops::endpoints))
        .route("/monitoring/digest", get(ops::digest))
        .route("/monitoring/alerts", get(ops::alerts))
        .route("/healthz", get(ops::healthz))
        .layer(from_fn_with_state(state.clone(), middleware::track_requests))
        .with_state(state)
}
