//! Monitoring HTTP endpoints.
//!
//! - `/monitoring/stats`     : global aggregates
//! - `/monitoring/requests`  : recent-request tail (`?limit=N`)
//! - `/monitoring/endpoints` : per-endpoint aggregates
//! - `/monitoring/digest`    : time-range digest (`?window_secs=N`)
//! - `/monitoring/alerts`    : accumulated alert digest
//! - `/healthz`              : liveness
//!
//! All handlers are read-only and idempotent.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use reqlens_core::query::{EndpointView, GlobalView};
use reqlens_core::report::DigestReport;
use reqlens_core::{Health, RequestRecord};

use crate::app_state::AppState;
use crate::notify::AlertDigestSummary;

pub async fn stats(State(state): State<AppState>) -> Json<GlobalView> {
    Json(state.query().global())
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

pub async fn requests(
    State(state): State<AppState>,
    Query(q): Query<RecentQuery>,
) -> Json<Vec<RequestRecord>> {
    let limit = q
        .limit
        .unwrap_or(state.cfg().collector.recent_default_limit)
        .min(state.cfg().collector.history_capacity);
    Json(state.query().recent(limit))
}

pub async fn endpoints(State(state): State<AppState>) -> Json<BTreeMap<String, EndpointView>> {
    Json(state.query().endpoints())
}

#[derive(Debug, Deserialize)]
pub struct DigestQuery {
    pub window_secs: Option<u64>,
}

pub async fn digest(
    State(state): State<AppState>,
    Query(q): Query<DigestQuery>,
) -> Json<DigestReport> {
    let end = SystemTime::now();
    let window = Duration::from_secs(q.window_secs.unwrap_or(3600));
    let start = end.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH);
    Json(state.query().digest(start, end))
}

pub async fn alerts(State(state): State<AppState>) -> Json<AlertDigestSummary> {
    let summary = match state.digest_sink() {
        Some(sink) => sink.summary(),
        None => AlertDigestSummary {
            total_alerts: 0,
            by_kind: BTreeMap::new(),
            recent: Vec::new(),
        },
    };
    Json(summary)
}

pub async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(state.query().health())
}
