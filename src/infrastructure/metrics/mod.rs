//! Prometheus Metrics Module
//!
//! Provides gateway-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Plain HTTP request counts by method and status
//! - Upgrade rejections by reason
//! - Active WebSocket connection gauge
//! - Finished WebSocket connections by teardown outcome

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - non-upgrade requests by method and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of non-upgrade HTTP requests")
            .namespace("room_gateway"),
        &["method", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// Upgrade requests refused before the handshake
pub static UPGRADE_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "upgrade_rejections_total",
            "Upgrade requests rejected before the WebSocket handshake",
        )
        .namespace("room_gateway"),
        &["reason"], // "no_room", "invalid_room"
    )
    .expect("Failed to create UPGRADE_REJECTIONS_TOTAL metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("room_gateway"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Finished WebSocket connections by outcome
pub static WEBSOCKET_CONNECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "websocket_connections_total",
            "Finished WebSocket connections by teardown outcome",
        )
        .namespace("room_gateway"),
        &["outcome"], // "closed", "terminated", "shutdown"
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(UPGRADE_REJECTIONS_TOTAL.clone()))
        .expect("Failed to register UPGRADE_REJECTIONS_TOTAL");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_TOTAL.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Helper to record a completed non-upgrade HTTP request
pub fn record_http_request(method: &str, status: u16) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, status.as_str()])
        .inc();
}

/// Helper to record a refused upgrade
pub fn record_upgrade_rejection(reason: &str) {
    UPGRADE_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
}

/// Helper to record an established connection
pub fn record_connection_opened() {
    WEBSOCKET_CONNECTIONS_ACTIVE.inc();
}

/// Helper to record a finished connection
pub fn record_connection_closed(outcome: &str) {
    WEBSOCKET_CONNECTIONS_ACTIVE.dec();
    WEBSOCKET_CONNECTIONS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}
