//! WebSocket Gateway
//!
//! Room-scoped WebSocket connections with heartbeat-enforced liveness.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod writer;

pub use connection::{ConnectionContext, Teardown};
pub use handler::{handle_upgrade_request, on_connection_established};
pub use messages::frame_from_message;
pub use writer::ConnectionWriter;
