//! Prometheus metrics for application observability.
//!
//! Metrics are exposed on a dedicated HTTP listener (default: `0.0.0.0:9090`).
//! Recording functions are no-ops until [`init_metrics`] installs a recorder,
//! so handlers and the client call them unconditionally.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gamehub_upstream_requests_total` - Upstream fetches (labels: operation, outcome)
//! - `gamehub_requests_rejected_total` - Requests rejected by the pipeline (label: reason)
//!
//! ## Histograms
//! - `gamehub_upstream_duration_seconds` - Upstream fetch duration (label: operation)
//! - `gamehub_request_duration_seconds` - HTTP request duration (labels: endpoint, method, status)
//!
//! # Usage
//!
//! ```rust,ignore
//! use gamehub::metrics::{init_metrics, record_upstream_request};
//!
//! init_metrics("0.0.0.0:9090".parse()?)?;
//! record_upstream_request("popular", "success", 0.21);
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const UPSTREAM_REQUESTS_TOTAL: &str = "gamehub_upstream_requests_total";
    pub const REQUESTS_REJECTED_TOTAL: &str = "gamehub_requests_rejected_total";
    pub const UPSTREAM_DURATION_SECONDS: &str = "gamehub_upstream_duration_seconds";
    pub const REQUEST_DURATION_SECONDS: &str = "gamehub_request_duration_seconds";
}

/// Initialize the Prometheus metrics exporter.
///
/// Installs the global recorder and starts the HTTP listener on
/// `metrics_addr`. Can only succeed once per process.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::UPSTREAM_REQUESTS_TOTAL,
        "Total number of requests sent to the game data provider"
    );
    describe_counter!(
        names::REQUESTS_REJECTED_TOTAL,
        "Total number of requests rejected before reaching a handler"
    );
    describe_histogram!(
        names::UPSTREAM_DURATION_SECONDS,
        "Game data provider request duration in seconds"
    );
    describe_histogram!(
        names::REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record one upstream fetch and how long it took.
///
/// `outcome` is `success`, `unavailable`, `malformed` or `rejected`.
pub fn record_upstream_request(operation: &'static str, outcome: &'static str, duration_secs: f64) {
    counter!(names::UPSTREAM_REQUESTS_TOTAL, "operation" => operation, "outcome" => outcome)
        .increment(1);
    histogram!(names::UPSTREAM_DURATION_SECONDS, "operation" => operation).record(duration_secs);
}

/// Record a request rejected by the middleware pipeline.
pub fn record_rejection(reason: &'static str) {
    counter!(names::REQUESTS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

/// Record HTTP request duration.
pub fn record_request_duration(endpoint: &str, method: &str, status: &str, duration_secs: f64) {
    histogram!(names::REQUEST_DURATION_SECONDS, "endpoint" => endpoint.to_string(), "method" => method.to_string(), "status" => status.to_string())
        .record(duration_secs);
}

/// Route-level middleware timing each matched request.
///
/// Labels use the route template (`/games/{id}`), not the concrete path.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response = next.run(request).await;

    record_request_duration(
        &endpoint,
        method.as_str(),
        response.status().as_str(),
        started.elapsed().as_secs_f64(),
    );
    response
}
