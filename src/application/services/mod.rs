//! Application Services
//!
//! Connection-level logic that sits between the transport and the domain.
//!
//! ## Available Services
//!
//! - **HeartbeatMonitor**: per-connection ping / timeout state machine
//! - **RoomRouter**: request path to room id resolution

pub mod heartbeat;
pub mod room_router;

pub use heartbeat::{HeartbeatEvent, HeartbeatMonitor, HeartbeatPolicy, HeartbeatState};
pub use room_router::{RoomRouter, MAX_ROOM_ID_LENGTH};
