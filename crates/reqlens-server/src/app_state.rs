//! Shared application state for the reqlens server.
//!
//! Construction wires the aggregate store, recorder, query service, and
//! (when alerts are enabled) the notification channel. The caller spawns
//! the returned `NotifyWorker` on its runtime.

use std::sync::Arc;

use reqlens_core::{AggregateStore, AlertHandler, EventRecorder, QueryService, Result};

use crate::config::ServerConfig;
use crate::notify::{self, DigestSink, LogSink, NotifyWorker, SinkRegistry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    store: Arc<AggregateStore>,
    recorder: Arc<EventRecorder>,
    query: QueryService,
    digest: Option<Arc<DigestSink>>,
}

impl AppState {
    /// Build application state. Returns the notify worker alongside so
    /// the caller controls where it is spawned; `None` when alerts are
    /// disabled or no sink is configured.
    pub fn new(cfg: ServerConfig) -> Result<(Self, Option<NotifyWorker>)> {
        let store = Arc::new(AggregateStore::new(cfg.store_config()));
        let query = QueryService::new(store.clone());

        let mut digest = None;
        let mut worker = None;
        let mut alerts: Option<Arc<dyn AlertHandler>> = None;

        if cfg.alerts.enabled && !cfg.alerts.sinks.is_empty() {
            let registry = Arc::new(SinkRegistry::new());
            for name in &cfg.alerts.sinks {
                match name.as_str() {
                    "log" => registry.register(Arc::new(LogSink)),
                    "digest" => {
                        let sink = Arc::new(DigestSink::new());
                        digest = Some(sink.clone());
                        registry.register(sink);
                    }
                    // validate() already rejected anything else
                    other => {
                        tracing::warn!(sink = other, "skipping unknown alert sink");
                    }
                }
            }
            let (handler, notify_worker) = notify::channel(registry);
            alerts = Some(handler as Arc<dyn AlertHandler>);
            worker = Some(notify_worker);
        }

        let recorder = Arc::new(EventRecorder::new(store.clone(), alerts));

        Ok((
            Self {
                inner: Arc::new(AppStateInner {
                    cfg,
                    store,
                    recorder,
                    query,
                    digest,
                }),
            },
            worker,
        ))
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> &Arc<AggregateStore> {
        &self.inner.store
    }

    pub fn recorder(&self) -> &Arc<EventRecorder> {
        &self.inner.recorder
    }

    pub fn query(&self) -> &QueryService {
        &self.inner.query
    }

    pub fn digest_sink(&self) -> Option<&Arc<DigestSink>> {
        self.inner.digest.as_ref()
    }
}
