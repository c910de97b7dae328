//! The dispatch-path hook.
//!
//! The host framework calls `record` exactly once per completed request,
//! including requests that terminate via a fault. That single call is
//! the entire contract between the host and the collector.

use std::sync::Arc;

use crate::alert::{AlertEvent, AlertHandler};
use crate::record::RequestRecord;
use crate::store::AggregateStore;

/// Commits one `RequestRecord` per request into the store, then hands
/// alert-worthy failures to the optional alert handler.
///
/// `record` never propagates a failure back into the request cycle it
/// instruments: malformed input is dropped into a diagnostic counter
/// and logged at `warn`.
pub struct EventRecorder {
    store: Arc<AggregateStore>,
    alerts: Option<Arc<dyn AlertHandler>>,
}

impl EventRecorder {
    pub fn new(store: Arc<AggregateStore>, alerts: Option<Arc<dyn AlertHandler>>) -> Self {
        Self { store, alerts }
    }

    /// Record one completed request. Duration is wall time from dispatch
    /// start to the point control returned to the framework.
    ///
    /// The commit is synchronous: it happens-before any snapshot that
    /// can observe it. Alert hand-off happens after the commit, outside
    /// the store lock, and is fire-and-forget.
    pub fn record(
        &self,
        endpoint: &str,
        method: &str,
        status_code: u16,
        duration_ms: f64,
        handled_fault: Option<&str>,
    ) {
        let record =
            match RequestRecord::new(endpoint, method, status_code, duration_ms, handled_fault) {
                Ok(r) => r,
                Err(e) => {
                    self.store.note_dropped();
                    tracing::warn!(endpoint, method, status_code, %e, "dropped malformed request record");
                    return;
                }
            };

        let event = self
            .alerts
            .as_ref()
            .and_then(|_| AlertEvent::from_record(&record));

        self.store.commit(record);

        if let (Some(handler), Some(event)) = (&self.alerts, event) {
            handler.alert(event);
        }
    }

    pub fn store(&self) -> &Arc<AggregateStore> {
        &self.store
    }
}
