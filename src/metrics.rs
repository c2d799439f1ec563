//! Prometheus metrics for application observability.
//!
//! Metrics are exposed via a dedicated HTTP endpoint (default port: 9090).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `prosepolish_logins_total` - Login attempts (label: status)
//! - `prosepolish_sessions_issued_total` - Session tokens created
//! - `prosepolish_request_tokens_issued_total` - Action tokens issued
//! - `prosepolish_auth_rejections_total` - Requests rejected by a trust
//!   boundary (label: boundary = session | csrf | action)
//!
//! # Usage
//!
//! ```rust,ignore
//! use prosepolish::metrics::{try_init_metrics, record_login};
//!
//! // Initialize metrics (call once at startup)
//! try_init_metrics(addr);
//!
//! // Record in handlers
//! record_login("success");
//! ```

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const LOGINS_TOTAL: &str = "prosepolish_logins_total";
    pub const SESSIONS_ISSUED_TOTAL: &str = "prosepolish_sessions_issued_total";
    pub const REQUEST_TOKENS_ISSUED_TOTAL: &str = "prosepolish_request_tokens_issued_total";
    pub const AUTH_REJECTIONS_TOTAL: &str = "prosepolish_auth_rejections_total";
}

/// Initialize the Prometheus metrics exporter.
///
/// # Errors
///
/// Returns an error message if the exporter cannot be installed (e.g., the
/// metrics port is already bound).
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::LOGINS_TOTAL,
        "Total login attempts, labeled by outcome"
    );
    describe_counter!(
        names::SESSIONS_ISSUED_TOTAL,
        "Total session tokens created"
    );
    describe_counter!(
        names::REQUEST_TOKENS_ISSUED_TOTAL,
        "Total short-lived action tokens issued"
    );
    describe_counter!(
        names::AUTH_REJECTIONS_TOTAL,
        "Requests rejected by a trust boundary, labeled by boundary"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
///
/// This is useful for cases where metrics are optional.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record a login attempt. Status: "success", "failure", or "blocked".
pub fn record_login(status: &str) {
    counter!(names::LOGINS_TOTAL, "status" => status.to_string()).increment(1);
}

/// Record a session token being created.
pub fn record_session_issued() {
    counter!(names::SESSIONS_ISSUED_TOTAL).increment(1);
}

/// Record an action token being issued.
pub fn record_request_token_issued() {
    counter!(names::REQUEST_TOKENS_ISSUED_TOTAL).increment(1);
}

/// Record a rejection at one of the trust boundaries.
/// Boundary: "session", "csrf", or "action".
pub fn record_auth_rejection(boundary: &str) {
    counter!(names::AUTH_REJECTIONS_TOTAL, "boundary" => boundary.to_string()).increment(1);
}
