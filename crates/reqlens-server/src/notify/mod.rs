//! Asynchronous notification fan-out.
//!
//! The recorder hands alert events to `ChannelAlerts`, which only pushes
//! onto an unbounded channel; a `NotifyWorker` task drains the channel
//! and fans each event out to the registered sinks. Delivery is
//! fire-and-forget: a failing sink is logged and skipped, and no
//! ordering is guaranteed relative to subsequent requests.

pub mod sinks;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;

use reqlens_core::{AlertEvent, AlertHandler, Result};

pub use sinks::{AlertDigestSummary, DigestSink, LogSink};

/// Outbound delivery channel (chat webhook, digest aggregator, ...).
/// Implementations own their wire format and retries; the worker only
/// logs failures.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn notify(&self, event: &AlertEvent) -> Result<()>;
}

/// Name-keyed sink registry.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: DashMap<&'static str, Arc<dyn NotificationSink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            sinks: DashMap::new(),
        }
    }

    pub fn register(&self, sink: Arc<dyn NotificationSink>) {
        self.sinks.insert(sink.name(), sink);
    }

    pub fn registered_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|e| *e.key()).collect()
    }

    /// Deliver one event to every sink. Failures are logged per sink and
    /// never propagate.
    pub async fn dispatch(&self, event: &AlertEvent) {
        let sinks: Vec<Arc<dyn NotificationSink>> =
            self.sinks.iter().map(|e| e.value().clone()).collect();
        for sink in sinks {
            if let Err(e) = sink.notify(event).await {
                tracing::warn!(sink = sink.name(), %e, "notification delivery failed");
            }
        }
    }
}

/// Non-blocking `AlertHandler`: enqueue and return. Used by the
/// recorder on the request path.
pub struct ChannelAlerts {
    tx: mpsc::UnboundedSender<AlertEvent>,
}

impl AlertHandler for ChannelAlerts {
    fn alert(&self, event: AlertEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("alert channel closed; event dropped");
        }
    }
}

/// Drains the alert channel and fans out to sinks. Runs until every
/// sender is dropped.
pub struct NotifyWorker {
    rx: mpsc::UnboundedReceiver<AlertEvent>,
    registry: Arc<SinkRegistry>,
}

impl NotifyWorker {
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            self.registry.dispatch(&event).await;
        }
        tracing::debug!("notify worker stopped");
    }
}

/// Build the channel pair feeding `registry`.
pub fn channel(registry: Arc<SinkRegistry>) -> (Arc<ChannelAlerts>, NotifyWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelAlerts { tx }), NotifyWorker { rx, registry })
}
