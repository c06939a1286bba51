//! # Value Objects
//!
//! Immutable identifiers and payload types shared by every layer.

mod client_id;
mod frame;
mod room_id;

pub use client_id::ClientId;
pub use frame::Frame;
pub use room_id::RoomId;
