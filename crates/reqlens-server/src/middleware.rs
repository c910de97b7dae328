//! Instrumentation middleware: the host-framework boundary.
//!
//! Wraps every dispatched request, measures wall time from dispatch
//! start to response completion, and calls the recorder exactly once —
//! including responses synthesized from handler faults. The endpoint
//! identity is the matched route pattern, not the raw URL, so
//! parameterized paths aggregate together.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// Response extension a handler inserts when it caught a specific error
/// type and mapped it to a response. Drives
/// `handled_exception:<type>` classification; ignored when the final
/// status is a success (the handler recovered).
#[derive(Debug, Clone)]
pub struct HandledFault(pub String);

pub async fn track_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().as_str().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let res = next.run(req).await;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    let handled_fault = res.extensions().get::<HandledFault>().map(|f| f.0.clone());
    state.recorder().record(
        &endpoint,
        &method,
        res.status().as_u16(),
        duration_ms,
        handled_fault.as_deref(),
    );

    res
}
