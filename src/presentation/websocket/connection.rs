//! WebSocket Connection State
//!
//! Identity of an established connection and the ways it can end.

use axum::extract::ws::close_code;

use crate::domain::{ClientId, RoomId};

/// Identity of one established connection, fixed for its whole life.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub client_id: ClientId,
    pub room: RoomId,
    /// Request URL as seen at upgrade time, for diagnostics
    pub url: String,
}

/// Why the connection loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The peer sent a close frame.
    Closed { code: u16 },
    /// The stream ended or failed without a close frame.
    Dropped,
    /// No liveness signal before the heartbeat timeout.
    Terminated,
    /// The server is shutting down.
    Shutdown,
}

impl Teardown {
    /// Close code reported in the `CLOSED` log line.
    pub fn close_code(&self) -> u16 {
        match self {
            Teardown::Closed { code } => *code,
            Teardown::Dropped | Teardown::Terminated => close_code::ABNORMAL,
            Teardown::Shutdown => close_code::AWAY,
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Teardown::Closed { .. } | Teardown::Dropped => "closed",
            Teardown::Terminated => "terminated",
            Teardown::Shutdown => "shutdown",
        }
    }
}

/// Render ids as `[a, b]` for log lines.
pub fn format_client_ids(ids: &[ClientId]) -> String {
    let joined = ids
        .iter()
        .map(ClientId::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}
