//! HTTP Handlers
//!
//! Request handlers for the gateway and the metrics listener.

pub mod gateway;
pub mod metrics;
