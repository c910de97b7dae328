//! Monitoring endpoint behavior, exercised through the handlers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::extract::{Query, State};

use reqlens_server::app_state::AppState;
use reqlens_server::config;
use reqlens_server::ops;

fn state_without_alerts() -> AppState {
    let cfg = config::load_from_str(
        r#"
version: 1
collector:
  history_capacity: 64
  sample_capacity: 64
  recent_default_limit: 10
alerts:
  enabled: false
"#,
    )
    .unwrap();
    let (state, worker) = AppState::new(cfg).unwrap();
    assert!(worker.is_none());
    state
}

#[tokio::test]
async fn stats_reflect_recorded_requests() {
    let state = state_without_alerts();
    let recorder = state.recorder().clone();
    recorder.record("/api/users", "GET", 200, 12.0, None);
    recorder.record("/api/users", "GET", 200, 8.0, None);
    recorder.record("/api/users", "POST", 500, 40.0, None);

    let axum::Json(global) = ops::stats(State(state)).await;
    assert_eq!(global.total_requests, 3);
    assert_eq!(global.total_errors, 1);
    assert_eq!(global.min_duration_ms, 8.0);
    assert_eq!(global.max_duration_ms, 40.0);
    assert_eq!(global.status_codes[&200], 2);
    assert_eq!(global.methods["GET"], 2);
    assert_eq!(global.error_types["server_error"], 1);
}

#[tokio::test]
async fn requests_endpoint_honors_limit_and_default() {
    let state = state_without_alerts();
    for i in 0..30u16 {
        state
            .recorder()
            .record("/api/items", "GET", 200, f64::from(i), None);
    }

    let axum::Json(tail) = ops::requests(
        State(state.clone()),
        Query(ops::RecentQuery { limit: Some(5) }),
    )
    .await;
    assert_eq!(tail.len(), 5);
    assert_eq!(tail[0].duration_ms, 25.0);

    // default limit comes from config (10)
    let axum::Json(tail) =
        ops::requests(State(state), Query(ops::RecentQuery { limit: None })).await;
    assert_eq!(tail.len(), 10);
}

#[tokio::test]
async fn endpoints_endpoint_groups_by_route() {
    let state = state_without_alerts();
    state.recorder().record("/a", "GET", 200, 1.0, None);
    state.recorder().record("/a", "GET", 404, 3.0, None);
    state.recorder().record("/b", "GET", 200, 2.0, None);

    let axum::Json(endpoints) = ops::endpoints(State(state)).await;
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints["/a"].count, 2);
    assert_eq!(endpoints["/a"].error_count, 1);
    assert_eq!(endpoints["/b"].count, 1);
}

#[tokio::test]
async fn digest_covers_the_trailing_window() {
    let state = state_without_alerts();
    state.recorder().record("/a", "GET", 500, 2.0, None);
    state.recorder().record("/a", "GET", 200, 4.0, None);

    let axum::Json(report) = ops::digest(
        State(state),
        Query(ops::DigestQuery {
            window_secs: Some(3600),
        }),
    )
    .await;
    assert_eq!(report.total_requests, 2);
    assert_eq!(report.total_errors, 1);
    assert_eq!(report.avg_duration_ms, 3.0);
    assert_eq!(report.top_endpoints[0].endpoint, "/a");
}

#[tokio::test]
async fn healthz_is_independent_of_data_volume() {
    let state = state_without_alerts();
    let axum::Json(before) = ops::healthz(State(state.clone())).await;
    assert_eq!(before.status, "ok");

    for _ in 0..1000 {
        state.recorder().record("/x", "GET", 200, 1.0, None);
    }
    let axum::Json(after) = ops::healthz(State(state)).await;
    assert_eq!(after.status, "ok");
}

#[tokio::test]
async fn alerts_endpoint_is_empty_without_digest_sink() {
    let state = state_without_alerts();
    let axum::Json(summary) = ops::alerts(State(state)).await;
    assert_eq!(summary.total_alerts, 0);
    assert!(summary.recent.is_empty());
}
