//! reqlens server binary.
//!
//! Boots the collector behind an axum listener:
//! - strict YAML config (falls back to defaults when the file is absent)
//! - tracing subscriber from `RUST_LOG`
//! - notification worker spawned off the request path

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use reqlens_server::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("REQLENS_CONFIG").unwrap_or_else(|_| "reqlens.yaml".to_string());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(%path, %e, "config load failed; using defaults");
            config::ServerConfig::default()
        }
    };

    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let (state, worker) = app_state::AppState::new(cfg).expect("state build failed");
    if let Some(worker) = worker {
        tokio::spawn(worker.run());
    }
    let app = router::build_router(state);

    tracing::info!(%listen, "reqlens-server starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
