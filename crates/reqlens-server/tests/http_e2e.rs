//! End-to-end: real listener, real requests, recorder fed by the
//! middleware exactly once per request.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use reqlens_server::app_state::AppState;
use reqlens_server::{config, router};

async fn serve() -> (AppState, SocketAddr) {
    let cfg = config::load_from_str("version: 1").unwrap();
    let (state, worker) = AppState::new(cfg).unwrap();
    if let Some(worker) = worker {
        tokio::spawn(worker.run());
    }
    let app = router::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (state, addr)
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

fn status_of(response: &str) -> u16 {
    response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap()
}

fn body_json(response: &str) -> serde_json::Value {
    let body = response.split_once("\r\n\r\n").unwrap().1;
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn middleware_records_each_request_once() {
    let (state, addr) = serve().await;

    assert_eq!(status_of(&get(addr, "/healthz").await), 200);
    assert_eq!(status_of(&get(addr, "/healthz").await), 200);
    assert_eq!(status_of(&get(addr, "/nope").await), 404);

    let snapshot = state.query().snapshot();
    assert_eq!(snapshot.global.total_requests, 3);
    assert_eq!(snapshot.global.total_errors, 1);
    assert_eq!(snapshot.endpoints["/healthz"].count, 2);
    assert_eq!(snapshot.global.error_types["client_error"], 1);
}

#[tokio::test]
async fn monitoring_surface_serves_json() {
    let (_state, addr) = serve().await;

    // prime the collector with its own traffic
    get(addr, "/healthz").await;

    let stats = get(addr, "/monitoring/stats").await;
    assert_eq!(status_of(&stats), 200);
    let stats = body_json(&stats);
    assert!(stats["total_requests"].as_u64().unwrap() >= 1);
    assert!(stats["uptime_seconds"].as_f64().unwrap() >= 0.0);

    let requests = get(addr, "/monitoring/requests?limit=5").await;
    assert_eq!(status_of(&requests), 200);
    let requests = body_json(&requests);
    assert_eq!(requests[0]["endpoint"], "/healthz");

    let endpoints = get(addr, "/monitoring/endpoints").await;
    assert_eq!(status_of(&endpoints), 200);
    let endpoints = body_json(&endpoints);
    assert!(endpoints.get("/healthz").is_some());

    let digest = get(addr, "/monitoring/digest?window_secs=60").await;
    assert_eq!(status_of(&digest), 200);
    let digest = body_json(&digest);
    assert!(digest["top_endpoints"].is_array());
}
