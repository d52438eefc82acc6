//! Prometheus metrics for the registration API.
//!
//! Metrics are recorded through the `metrics` facade and exported in
//! Prometheus text format when [`init_metrics`] has installed the exporter.
//! Without an exporter the calls are no-ops.
//!
//! # Metrics
//!
//! - `http_requests_total`, `http_request_duration_ms`
//! - `ledger_operations_total` labelled by operation and outcome
//! - `registrations_created_total`
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bb_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/admin/registrations/{id}/confirm", 200);
//! metrics::ledger_operation("confirm_payment", "ok");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Count a ledger operation by outcome (`ok`, `capacity_exceeded`, ...)
pub fn ledger_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!("ledger_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Increment the new registrations counter.
pub fn registrations_created_total() {
    metrics::counter!("registrations_created_total").increment(1);
}
