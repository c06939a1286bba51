//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Reasons an upgrade request cannot be routed to a room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("No room specified")]
    NoRoomSpecified,

    #[error("Invalid room id: {0}")]
    InvalidRoomId(String),
}

impl RoutingError {
    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            RoutingError::NoRoomSpecified => "no_room",
            RoutingError::InvalidRoomId(_) => "invalid_room",
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Refused before the handshake: bare status, no body, and the
            // socket is not kept around for another request.
            AppError::Routing(_) => {
                (StatusCode::FORBIDDEN, [(header::CONNECTION, "close")]).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
