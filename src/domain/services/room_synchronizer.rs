//! Room synchronizer contract.
//!
//! The synchronizer owns room membership and whatever data exchange happens
//! between the members of a room. The gateway only attaches and detaches
//! connections, forwards their data frames, and reads membership for
//! diagnostics.

use tokio::sync::mpsc;

use crate::domain::value_objects::{ClientId, Frame, RoomId};

/// Bounded channel the synchronizer uses to push frames to one connection.
///
/// Senders must not wait on it: a full queue means the peer is not keeping
/// up, and the frame is dropped.
pub type OutboundSender = mpsc::Sender<Frame>;

/// Membership and message routing for rooms.
///
/// Implementations must be safe to call from many connection tasks at once.
/// Membership must be read through [`RoomSynchronizer::client_ids`] every
/// time; callers never cache it.
#[cfg_attr(test, mockall::automock)]
pub trait RoomSynchronizer: Send + Sync {
    /// Bind a freshly upgraded connection into `room` and return its id.
    fn attach(&self, room: &RoomId, outbound: OutboundSender) -> ClientId;

    /// Hand a data frame received from `client` to the synchronizer.
    fn receive(&self, room: &RoomId, client: &ClientId, frame: Frame);

    /// Remove `client` from `room`. Unknown clients are ignored.
    fn detach(&self, room: &RoomId, client: &ClientId);

    /// Ids currently in `room`, in join order.
    fn client_ids(&self, room: &RoomId) -> Vec<ClientId>;
}
