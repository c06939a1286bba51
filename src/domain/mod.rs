//! # Domain Layer
//!
//! Core types of the room gateway. Independent of the HTTP framework and of
//! any concrete synchronizer.
//!
//! ## Structure
//!
//! - **value_objects**: identifiers and data frames (RoomId, ClientId, Frame)
//! - **services**: the `RoomSynchronizer` collaborator contract

pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use services::*;
pub use value_objects::*;
