//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Room synchronizers
//! - Prometheus metrics

pub mod metrics;
pub mod synchronizer;
