//! Prometheus metrics for the reachability service
//!
//! This module tracks:
//! - Probes: outcome counts
//! - Batches: how many ran and how large they were
//! - Checks: duration of a full reachability check
//! - API: request counts by endpoint and status
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! Until then, and if initialization fails, metrics operations are no-ops.

use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, CounterVec, Encoder,
    Histogram, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all service metrics
struct ReachabilityMetrics {
    probes: CounterVec,
    batches: CounterVec,
    batch_size: Histogram,
    check_duration: Histogram,
    api_requests: CounterVec,
    api_duration: HistogramVec,
}

/// Global storage for service metrics
static METRICS: OnceLock<ReachabilityMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Registration happens against the default registry, once. A second call is
/// a no-op that returns `Ok(())`.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = reachable::metrics::init_metrics() {
///     tracing::warn!("Metrics initialization failed: {e}");
///     // Application can continue without metrics
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    // Prevent double initialization
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = ReachabilityMetrics {
        probes: register_counter_vec!(
            "reachable_probes_total",
            "Total server probes by outcome",
            &["outcome"]
        )?,
        batches: register_counter_vec!(
            "reachable_batches_total",
            "Total probe batches executed, labelled by whether any server was online",
            &["result"]
        )?,
        batch_size: register_histogram!(
            "reachable_batch_size",
            "Number of servers probed per batch",
            vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0]
        )?,
        check_duration: register_histogram!(
            "reachable_check_duration_seconds",
            "Duration of a full reachability check in seconds",
            vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
        )?,
        api_requests: register_counter_vec!(
            "reachable_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
        api_duration: register_histogram_vec!(
            "reachable_api_request_duration_seconds",
            "API request duration in seconds",
            &["endpoint"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
    };

    METRICS.set(metrics).map_err(|_| "Metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record one probe outcome
pub fn record_probe(online: bool) {
    if let Some(m) = METRICS.get() {
        let outcome = if online { "online" } else { "offline" };
        m.probes.with_label_values(&[outcome]).inc();
    }
}

/// Record a settled batch
pub fn record_batch(size: usize, online: usize) {
    let Some(m) = METRICS.get() else {
        return;
    };

    let result = if online > 0 { "some_online" } else { "all_offline" };
    m.batches.with_label_values(&[result]).inc();
    m.batch_size.observe(size as f64);
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16, duration_secs: f64) {
    let Some(m) = METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[endpoint, status_str.as_str()])
        .inc();
    m.api_duration
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a reachability check timer
pub fn start_check_timer() -> MetricsTimer {
    match METRICS.get() {
        Some(m) => MetricsTimer::new(m.check_duration.start_timer()),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
