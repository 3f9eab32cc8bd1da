//! Bridge metrics for monitoring and observability.
//!
//! Counters cover the whole request pipeline: messages received, responses
//! dispatched, requests dropped, spawn failures, and capture truncation.
//! Truncation is deliberately invisible to callers, so this collector (plus
//! the log stream) is the only place it can be observed.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for a bridge instance.
pub struct BridgeMetrics {
    requests_total: AtomicU64,
    dispatched_total: AtomicU64,
    error_responses_total: AtomicU64,
    dropped_total: AtomicU64,
    spawn_failures_total: AtomicU64,
    truncated_streams_total: AtomicU64,
    executions_total: AtomicU64,
    total_execution_time_us: AtomicU64,
    error_counts: Mutex<HashMap<String, u64>>,
}

impl BridgeMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            dispatched_total: AtomicU64::new(0),
            error_responses_total: AtomicU64::new(0),
            dropped_total: AtomicU64::new(0),
            spawn_failures_total: AtomicU64::new(0),
            truncated_streams_total: AtomicU64::new(0),
            executions_total: AtomicU64::new(0),
            total_execution_time_us: AtomicU64::new(0),
            error_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Record an inbound message, before decoding.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully dispatched response.
    pub fn record_dispatched(&self) {
        self.dispatched_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dispatched response carrying a non-null error.
    pub fn record_error_response(&self, code: &str) {
        self.error_responses_total.fetch_add(1, Ordering::Relaxed);
        self.record_error(code);
    }

    /// Record a request dropped without any dispatch.
    pub fn record_dropped(&self, code: &str) {
        self.dropped_total.fetch_add(1, Ordering::Relaxed);
        self.record_error(code);
    }

    /// Record a spawn failure.
    pub fn record_spawn_failure(&self) {
        self.spawn_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record streams that lost bytes to the capture bound.
    pub fn record_truncation(&self, streams: u64) {
        self.truncated_streams_total
            .fetch_add(streams, Ordering::Relaxed);
    }

    /// Record one completed child execution and its wall-clock duration.
    pub fn record_execution(&self, duration: Duration) {
        self.executions_total.fetch_add(1, Ordering::Relaxed);
        self.total_execution_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    fn record_error(&self, code: &str) {
        let mut counts = self.error_counts.lock();
        *counts.entry(code.to_string()).or_insert(0) += 1;
    }

    /// Total inbound messages.
    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Total successful dispatches.
    pub fn dispatched_total(&self) -> u64 {
        self.dispatched_total.load(Ordering::Relaxed)
    }

    /// Total dispatched error responses.
    pub fn error_responses_total(&self) -> u64 {
        self.error_responses_total.load(Ordering::Relaxed)
    }

    /// Total requests dropped without a dispatch.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.load(Ordering::Relaxed)
    }

    /// Total spawn failures.
    pub fn spawn_failures_total(&self) -> u64 {
        self.spawn_failures_total.load(Ordering::Relaxed)
    }

    /// Total streams truncated by the capture bound.
    pub fn truncated_streams_total(&self) -> u64 {
        self.truncated_streams_total.load(Ordering::Relaxed)
    }

    /// Average child execution time in microseconds.
    pub fn avg_execution_time_us(&self) -> f64 {
        let executions = self.executions_total.load(Ordering::Relaxed);
        if executions == 0 {
            0.0
        } else {
            self.total_execution_time_us.load(Ordering::Relaxed) as f64 / executions as f64
        }
    }

    /// Error counts keyed by stable error code.
    pub fn error_counts(&self) -> HashMap<String, u64> {
        self.error_counts.lock().clone()
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        self.requests_total.store(0, Ordering::Relaxed);
        self.dispatched_total.store(0, Ordering::Relaxed);
        self.error_responses_total.store(0, Ordering::Relaxed);
        self.dropped_total.store(0, Ordering::Relaxed);
        self.spawn_failures_total.store(0, Ordering::Relaxed);
        self.truncated_streams_total.store(0, Ordering::Relaxed);
        self.executions_total.store(0, Ordering::Relaxed);
        self.total_execution_time_us.store(0, Ordering::Relaxed);
        self.error_counts.lock().clear();
    }

    /// Export Prometheus-format metrics.
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP webshell_requests_total Inbound bridge messages\n");
        output.push_str("# TYPE webshell_requests_total counter\n");
        output.push_str(&format!(
            "webshell_requests_total {}\n",
            self.requests_total()
        ));

        output.push_str("\n# HELP webshell_responses_total Responses handed to the evaluator\n");
        output.push_str("# TYPE webshell_responses_total counter\n");
        output.push_str(&format!(
            "webshell_responses_total{{outcome=\"ok\"}} {}\n",
            self.dispatched_total()
        ));
        output.push_str(&format!(
            "webshell_responses_total{{outcome=\"error\"}} {}\n",
            self.error_responses_total()
        ));

        output.push_str("\n# HELP webshell_dropped_total Requests dropped without a dispatch\n");
        output.push_str("# TYPE webshell_dropped_total counter\n");
        output.push_str(&format!("webshell_dropped_total {}\n", self.dropped_total()));

        output.push_str("\n# HELP webshell_spawn_failures_total Child processes the OS refused to create\n");
        output.push_str("# TYPE webshell_spawn_failures_total counter\n");
        output.push_str(&format!(
            "webshell_spawn_failures_total {}\n",
            self.spawn_failures_total()
        ));

        output.push_str("\n# HELP webshell_truncated_streams_total Capture streams that hit the bound\n");
        output.push_str("# TYPE webshell_truncated_streams_total counter\n");
        output.push_str(&format!(
            "webshell_truncated_streams_total {}\n",
            self.truncated_streams_total()
        ));

        output.push_str("\n# HELP webshell_execution_time_us Average child execution time\n");
        output.push_str("# TYPE webshell_execution_time_us gauge\n");
        output.push_str(&format!(
            "webshell_execution_time_us {:.2}\n",
            self.avg_execution_time_us()
        ));

        output.push_str("\n# HELP webshell_errors_total Error counts by code\n");
        output.push_str("# TYPE webshell_errors_total counter\n");
        for (code, count) in self.error_counts() {
            output.push_str(&format!(
                "webshell_errors_total{{code=\"{}\"}} {}\n",
                code, count
            ));
        }

        output
    }
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
