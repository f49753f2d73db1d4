//! Observability for the pollers
//!
//! Provides:
//! - Prometheus metrics (samples emitted, analytics failures, cycle errors and latency)
//! - Structured logging of polling cycles with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

/// Histogram buckets for cycle latency (in seconds)
const CYCLE_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

static GLOBAL_METRICS: OnceLock<PollerMetricsInner> = OnceLock::new();

struct PollerMetricsInner {
    samples_emitted: IntCounterVec,
    analytics_failures: IntCounter,
    cycle_errors: IntCounterVec,
    cycle_duration_seconds: Histogram,
}

impl PollerMetricsInner {
    fn new() -> Self {
        Self {
            samples_emitted: register_int_counter_vec!(
                "contrail_meter_samples_emitted_total",
                "Samples produced per meter",
                &["meter"]
            )
            .expect("Failed to register samples_emitted"),

            analytics_failures: register_int_counter!(
                "contrail_meter_analytics_failures_total",
                "Analytics API responses with a non-200 status"
            )
            .expect("Failed to register analytics_failures"),

            cycle_errors: register_int_counter_vec!(
                "contrail_meter_cycle_errors_total",
                "Resources whose sample emission ended with an error",
                &["meter"]
            )
            .expect("Failed to register cycle_errors"),

            cycle_duration_seconds: register_histogram!(
                "contrail_meter_cycle_duration_seconds",
                "Time spent polling one meter across all resources",
                CYCLE_BUCKETS.to_vec()
            )
            .expect("Failed to register cycle_duration_seconds"),
        }
    }
}

/// Handle to the process-wide poller metrics; clones share the same metrics.
#[derive(Clone)]
pub struct PollerMetrics {
    _private: (),
}

impl Default for PollerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PollerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PollerMetricsInner {
        GLOBAL_METRICS.get_or_init(PollerMetricsInner::new)
    }

    pub fn inc_samples(&self, meter: &str, count: u64) {
        self.inner()
            .samples_emitted
            .with_label_values(&[meter])
            .inc_by(count);
    }

    pub fn inc_analytics_failures(&self) {
        self.inner().analytics_failures.inc();
    }

    pub fn inc_cycle_errors(&self, meter: &str) {
        self.inner().cycle_errors.with_label_values(&[meter]).inc();
    }

    pub fn observe_cycle(&self, elapsed: Duration) {
        self.inner()
            .cycle_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    /// Samples emitted so far for `meter`
    pub fn samples_emitted(&self, meter: &str) -> u64 {
        self.inner()
            .samples_emitted
            .with_label_values(&[meter])
            .get()
    }

    /// Prometheus text exposition of the default registry
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for polling cycle events
#[derive(Clone)]
pub struct StructuredLogger {
    meter: String,
}

impl StructuredLogger {
    pub fn new(meter: impl Into<String>) -> Self {
        Self {
            meter: meter.into(),
        }
    }

    pub fn log_cycle_start(&self, resources: usize) {
        info!(
            event = "cycle_start",
            meter = %self.meter,
            resources = resources,
            "Polling meter"
        );
    }

    pub fn log_resource_failure(&self, resource: &str, error: &crate::Error) {
        warn!(
            event = "resource_failed",
            meter = %self.meter,
            resource = %resource,
            error = %error,
            "Sample emission stopped for resource"
        );
    }

    pub fn log_cycle_complete(&self, samples: usize, failures: usize, elapsed: Duration) {
        info!(
            event = "cycle_complete",
            meter = %self.meter,
            samples = samples,
            failures = failures,
            elapsed_ms = elapsed.as_millis() as u64,
            "Polling cycle complete"
        );
    }
}
