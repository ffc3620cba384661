//! Metrics for cascade provider attempts.
//!
//! Provides OpenTelemetry-based counters for attempts, failures, token usage and
//! fallthroughs, plus a latency histogram. No exporter is installed here; without one
//! the global meter is a no-op.

use cascade_error::FailureClass;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::OnceLock;

static METRICS: OnceLock<CascadeMetrics> = OnceLock::new();

/// Metrics for provider attempts made by a cascade.
///
/// Labelled with provider and model; failures also carry the failure class.
#[derive(Clone)]
pub struct CascadeMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Provider attempts, successful or not
    pub attempts: Counter<u64>,
    /// Failed provider attempts
    pub failures: Counter<u64>,
    /// Attempt duration in seconds
    pub duration: Histogram<f64>,
    /// Tokens charged by providers
    pub tokens_used: Counter<u64>,
    /// Providers abandoned in favour of the next one
    pub fallthroughs: Counter<u64>,
}

impl CascadeMetrics {
    fn init() -> Self {
        let meter = global::meter("cascade");

        Self {
            _meter: meter.clone(),
            attempts: meter
                .u64_counter("cascade.attempts")
                .with_description("Provider attempts")
                .build(),
            failures: meter
                .u64_counter("cascade.failures")
                .with_description("Failed provider attempts")
                .build(),
            duration: meter
                .f64_histogram("cascade.attempt.duration")
                .with_unit("seconds")
                .with_description("Provider attempt duration")
                .build(),
            tokens_used: meter
                .u64_counter("cascade.tokens")
                .with_description("Tokens charged by providers")
                .build(),
            fallthroughs: meter
                .u64_counter("cascade.fallthroughs")
                .with_description("Providers abandoned for the next in line")
                .build(),
        }
    }

    /// Get the global cascade metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a successful attempt.
    pub fn record_success(&self, provider: &str, model: &str, duration_secs: f64, tokens: u64) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.attempts.add(1, labels);
        self.duration.record(duration_secs, labels);
        self.tokens_used.add(tokens, labels);
    }

    /// Record a failed attempt.
    pub fn record_failure(
        &self,
        provider: &str,
        model: &str,
        duration_secs: f64,
        class: FailureClass,
    ) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.attempts.add(1, labels);
        self.duration.record(duration_secs, labels);

        let class: &'static str = class.into();
        self.failures.add(
            1,
            &[
                KeyValue::new("provider", provider.to_string()),
                KeyValue::new("model", model.to_string()),
                KeyValue::new("class", class),
            ],
        );
    }

    /// Record that a cascade gave up on a provider.
    pub fn record_fallthrough(&self, provider: &str, reason: &'static str) {
        self.fallthroughs.add(
            1,
            &[
                KeyValue::new("provider", provider.to_string()),
                KeyValue::new("reason", reason),
            ],
        );
    }
}

impl Default for CascadeMetrics {
    fn default() -> Self {
        Self::get().clone()
    }
}
