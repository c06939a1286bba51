//! Application Layer
//!
//! Liveness enforcement and room routing.

pub mod services;
