//! Presentation Layer
//!
//! HTTP entry point and WebSocket connection handling.

pub mod http;
pub mod middleware;
pub mod websocket;
