//! Observability infrastructure for space synchronization
//!
//! Provides:
//! - Prometheus metrics (requests dispatched, throttle wait, items synced and failed)
//! - Structured logging of sync events with tracing

use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Histogram buckets for throttle wait (in seconds)
const WAIT_BUCKETS: &[f64] = &[0.0, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SyncMetricsInner> = OnceLock::new();

struct SyncMetricsInner {
    requests_dispatched: IntCounterVec,
    throttle_wait_seconds: Histogram,
    items_synced: IntCounterVec,
    item_failures: IntCounterVec,
}

impl SyncMetricsInner {
    fn new() -> Self {
        Self {
            requests_dispatched: register_int_counter_vec!(
                "cfm_requests_dispatched_total",
                "Management API requests released by the throttle",
                &["method"]
            )
            .expect("Failed to register requests_dispatched"),

            throttle_wait_seconds: register_histogram!(
                "cfm_throttle_wait_seconds",
                "Time requests spent queued in the throttle",
                WAIT_BUCKETS.to_vec()
            )
            .expect("Failed to register throttle_wait_seconds"),

            items_synced: register_int_counter_vec!(
                "cfm_items_synced_total",
                "Content types and entries synchronized",
                &["kind"]
            )
            .expect("Failed to register items_synced"),

            item_failures: register_int_counter_vec!(
                "cfm_item_failures_total",
                "Content types and entries that failed to synchronize",
                &["kind"]
            )
            .expect("Failed to register item_failures"),
        }
    }
}

/// Handle to the process-wide sync metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct SyncMetrics {
    _private: (),
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SyncMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SyncMetricsInner {
        GLOBAL_METRICS.get_or_init(SyncMetricsInner::new)
    }

    /// Count a dispatched request
    pub fn inc_requests(&self, method: &str) {
        self.inner()
            .requests_dispatched
            .with_label_values(&[method])
            .inc();
    }

    /// Record time spent waiting for a throttle slot
    pub fn observe_throttle_wait(&self, waited: Duration) {
        self.inner()
            .throttle_wait_seconds
            .observe(waited.as_secs_f64());
    }

    /// Count a synced item of `kind`
    pub fn inc_synced(&self, kind: &str) {
        self.inner().items_synced.with_label_values(&[kind]).inc();
    }

    /// Count a failed item of `kind`
    pub fn inc_failures(&self, kind: &str) {
        self.inner().item_failures.with_label_values(&[kind]).inc();
    }

    /// Requests dispatched so far for `method`
    pub fn requests(&self, method: &str) -> u64 {
        self.inner()
            .requests_dispatched
            .with_label_values(&[method])
            .get()
    }

    /// Prometheus text exposition of the default registry
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for sync events
#[derive(Clone)]
pub struct SyncLogger {
    space_id: String,
}

impl SyncLogger {
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
        }
    }

    pub fn log_sync_started(&self, operation: &str, items: usize) {
        info!(
            event = "sync_started",
            space = %self.space_id,
            operation = %operation,
            items = items,
            "Starting sync"
        );
    }

    pub fn log_sync_finished(
        &self,
        operation: &str,
        succeeded: usize,
        failed: usize,
        elapsed: Duration,
    ) {
        if failed == 0 {
            info!(
                event = "sync_finished",
                space = %self.space_id,
                operation = %operation,
                succeeded = succeeded,
                failed = failed,
                elapsed_ms = elapsed.as_millis() as u64,
                "Sync finished"
            );
        } else {
            warn!(
                event = "sync_finished",
                space = %self.space_id,
                operation = %operation,
                succeeded = succeeded,
                failed = failed,
                elapsed_ms = elapsed.as_millis() as u64,
                "Sync finished with failures"
            );
        }
    }

    pub fn log_content_type_synced(&self, id: &str, version: Option<u64>, controls: usize) {
        info!(
            event = "content_type_synced",
            space = %self.space_id,
            content_type = %id,
            version = ?version,
            editor_controls = controls,
            "Content type published"
        );
    }

    pub fn log_entry_synced(&self, id: &str, action: &str, version: Option<u64>) {
        info!(
            event = "entry_synced",
            space = %self.space_id,
            entry = %id,
            action = %action,
            version = ?version,
            "Entry published"
        );
    }

    pub fn log_item_failed(&self, operation: &str, item: &str, error: &dyn std::error::Error) {
        warn!(
            event = "item_failed",
            space = %self.space_id,
            operation = %operation,
            item = %item,
            error = %error,
            "Item failed to sync"
        );
    }

    /// Log a dispatched request and its throttle wait
    pub fn log_request(&self, method: &str, url: &str, waited: Duration) {
        debug!(
            event = "request_dispatched",
            space = %self.space_id,
            method = %method,
            url = %url,
            throttle_wait_ms = waited.as_millis() as u64,
            "Dispatching request"
        );
    }
}
