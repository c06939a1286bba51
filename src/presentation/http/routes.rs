//! Route Configuration
//!
//! The public listener has no fixed routes: every path is either a room
//! (upgrade) or answered with a redirect or an upgrade requirement. Metrics
//! live on their own listener.

use axum::{routing::get, Router};

use super::handlers;
use crate::presentation::middleware::create_trace_layer;
use crate::startup::AppState;

/// Create the public gateway router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::gateway::handle_request)
        .layer(create_trace_layer())
        .with_state(state)
}

/// Create the router served on the metrics listener
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(handlers::metrics::metrics_handler))
}
