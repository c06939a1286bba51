//! # Domain Services
//!
//! Contracts for collaborators the gateway consumes but does not own.
//!
//! ## Services
//!
//! - **RoomSynchronizer**: room membership and data exchange between members

mod room_synchronizer;

pub use room_synchronizer::*;
