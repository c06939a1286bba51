//! Room Synchronizer Implementations
//!
//! Concrete implementations of the domain `RoomSynchronizer` trait.
//!
//! ## Available Synchronizers
//!
//! - **RelaySynchronizer** - in-memory membership with addressed frame relay

mod relay;

pub use relay::{RelaySynchronizer, ENVELOPE_SEPARATOR};
