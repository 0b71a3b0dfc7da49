//! Prometheus metrics for the scan loop
//!
//! Provides observability metrics for monitoring the watcher in
//! production.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};

lazy_static! {
    /// Histogram: duration of one full pass (seconds)
    pub static ref PASS_DURATION: Histogram = register_histogram!(
        "dropwatch_pass_duration_seconds",
        "Duration of one scan pass over all folders",
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("Failed to create pass_duration metric");

    /// Counter: completed passes by status
    pub static ref PASS_CYCLES: CounterVec = register_counter_vec!(
        "dropwatch_pass_cycles_total",
        "Total scan passes by status",
        &["status"]
    )
    .expect("Failed to create pass_cycles metric");

    /// Counter: per-folder listing failures
    pub static ref LIST_FAILURES: CounterVec = register_counter_vec!(
        "dropwatch_list_failures_total",
        "Folder listing failures by folder",
        &["folder"]
    )
    .expect("Failed to create list_failures metric");

    /// Counter: delivery failures
    pub static ref DELIVERY_FAILURES: Counter = register_counter!(
        "dropwatch_delivery_failures_total",
        "Webhook delivery failures"
    )
    .expect("Failed to create delivery_failures metric");

    /// Counter: items reported in notifications
    pub static ref ITEMS_REPORTED: Counter = register_counter!(
        "dropwatch_items_reported_total",
        "New files reported in notifications"
    )
    .expect("Failed to create items_reported metric");

    /// Gauge: folders scanned in the last pass
    pub static ref FOLDERS_SCANNED: Gauge = register_gauge!(
        "dropwatch_folders_scanned",
        "Folders scanned in the most recent pass"
    )
    .expect("Failed to create folders_scanned metric");

    /// Gauge: daemon health status (1 = healthy, 0 = unhealthy)
    pub static ref HEALTH_STATUS: Gauge = register_gauge!(
        "dropwatch_health_status",
        "Daemon health status (1 = healthy, 0 = unhealthy)"
    )
    .expect("Failed to create health_status metric");
}

/// Record a completed pass
pub fn record_pass(status: &str, duration_secs: f64, folders_scanned: usize) {
    PASS_CYCLES.with_label_values(&[status]).inc();
    PASS_DURATION.observe(duration_secs);
    FOLDERS_SCANNED.set(folders_scanned as f64);
}

/// Increment the listing failure counter for a folder
pub fn record_list_failure(folder: &str) {
    LIST_FAILURES.with_label_values(&[folder]).inc();
}

/// Increment the delivery failure counter
pub fn record_delivery_failure() {
    DELIVERY_FAILURES.inc();
}

/// Count items reported in a notification
pub fn record_items_reported(count: usize) {
    ITEMS_REPORTED.inc_by(count as f64);
}

/// Set health status
pub fn set_health_status(healthy: bool) {
    HEALTH_STATUS.set(if healthy { 1.0 } else { 0.0 });
}

/// Encode all metrics as Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
