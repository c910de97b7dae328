//! Built-in notification sinks.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use reqlens_core::{AlertEvent, Result};

use super::NotificationSink;

/// Emits alerts into the structured log stream.
#[derive(Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &AlertEvent) -> Result<()> {
        tracing::error!(
            endpoint = %event.endpoint,
            method = %event.method,
            status_code = event.status_code,
            error_kind = %event.error_kind,
            message = event.message.as_deref().unwrap_or(""),
            "request alert"
        );
        Ok(())
    }
}

/// How many raw events the digest keeps for display.
const DIGEST_RECENT_CAP: usize = 100;

/// Accumulates alert events between digest flushes: per-kind counts and
/// a bounded tail of raw events. A scheduled reporter (out of core
/// scope) reads `summary()` and resets via `drain()`.
#[derive(Default)]
pub struct DigestSink {
    by_kind: DashMap<String, u64>,
    recent: Mutex<VecDeque<AlertEvent>>,
}

/// Read-only digest of accumulated alerts.
#[derive(Debug, Clone, Serialize)]
pub struct AlertDigestSummary {
    pub total_alerts: u64,
    pub by_kind: BTreeMap<String, u64>,
    /// Most recent alert events, oldest first, at most 100.
    pub recent: Vec<AlertEvent>,
}

impl DigestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> AlertDigestSummary {
        let by_kind: BTreeMap<String, u64> = self
            .by_kind
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        let recent: Vec<AlertEvent> = self
            .recent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        AlertDigestSummary {
            total_alerts: by_kind.values().sum(),
            by_kind,
            recent,
        }
    }

    /// Return the current summary and reset the accumulators.
    pub fn drain(&self) -> AlertDigestSummary {
        let summary = self.summary();
        self.by_kind.clear();
        self.recent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
        summary
    }
}

#[async_trait]
impl NotificationSink for DigestSink {
    fn name(&self) -> &'static str {
        "digest"
    }

    async fn notify(&self, event: &AlertEvent) -> Result<()> {
        *self.by_kind.entry(event.error_kind.clone()).or_insert(0) += 1;
        let mut recent = self
            .recent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if recent.len() == DIGEST_RECENT_CAP {
            recent.pop_front();
        }
        recent.push_back(event.clone());
        Ok(())
    }
}
