//! In-memory relay synchronizer.
//!
//! Keeps room membership in process memory and relays text frames between
//! members of the same room using an addressed envelope:
//!
//! ```text
//! inbound  (from client A):  "{to}\n{body}"
//! outbound (to client B):    "{A}\n{body}"
//! ```
//!
//! An empty `{to}` broadcasts to every other member of A's room. The relay
//! does not look at `{body}`; merging state is the clients' business.

use dashmap::DashMap;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::{ClientId, Frame, OutboundSender, RoomId, RoomSynchronizer};

/// Separator between the address and the body of a relayed frame.
pub const ENVELOPE_SEPARATOR: char = '\n';

/// One attached connection.
#[derive(Debug)]
struct Member {
    room: RoomId,
    outbound: OutboundSender,
}

/// DashMap-backed [`RoomSynchronizer`].
#[derive(Debug, Default)]
pub struct RelaySynchronizer {
    /// Client id -> member
    members: DashMap<ClientId, Member>,
    /// Room -> client ids in join order
    rooms: DashMap<RoomId, Vec<ClientId>>,
}

impl RelaySynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[cfg(test)]
    fn client_count(&self) -> usize {
        self.members.len()
    }

    /// Queue `frame` for `to` without waiting. Returns `false` if `to` is
    /// unknown or already gone; a full queue drops the frame but returns `true`.
    fn send_to(&self, to: &ClientId, frame: Frame) -> bool {
        let Some(member) = self.members.get(to) else {
            return false;
        };

        match member.outbound.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Closed(_)) => false,
            Err(TrySendError::Full(frame)) => {
                tracing::debug!(
                    client_id = %to,
                    len = frame.len(),
                    "Outbound queue full, dropping frame"
                );
                true
            }
        }
    }
}

impl RoomSynchronizer for RelaySynchronizer {
    fn attach(&self, room: &RoomId, outbound: OutboundSender) -> ClientId {
        let client_id = ClientId::generate();

        self.members.insert(
            client_id.clone(),
            Member {
                room: room.clone(),
                outbound,
            },
        );
        self.rooms
            .entry(room.clone())
            .or_default()
            .push(client_id.clone());

        tracing::debug!(room = %room, client_id = %client_id, "Client attached");
        client_id
    }

    fn receive(&self, room: &RoomId, client: &ClientId, frame: Frame) {
        let text = match frame {
            Frame::Text(text) => text,
            Frame::Binary(data) => {
                tracing::debug!(
                    client_id = %client,
                    len = data.len(),
                    "Dropping binary frame"
                );
                return;
            }
        };

        let Some((to, body)) = text.split_once(ENVELOPE_SEPARATOR) else {
            tracing::debug!(client_id = %client, "Dropping frame without address");
            return;
        };

        let forwarded = format!("{}{}{}", client, ENVELOPE_SEPARATOR, body);

        if to.is_empty() {
            // Snapshot first; never hold a room guard while touching `members`.
            let recipients: Vec<ClientId> = self
                .rooms
                .get(room)
                .map(|ids| ids.iter().filter(|id| *id != client).cloned().collect())
                .unwrap_or_default();

            for recipient in &recipients {
                self.send_to(recipient, Frame::Text(forwarded.clone()));
            }
            return;
        }

        let target = ClientId::from(to);
        let same_room = self
            .members
            .get(&target)
            .is_some_and(|member| &member.room == room);

        if !same_room || !self.send_to(&target, Frame::Text(forwarded)) {
            tracing::debug!(
                client_id = %client,
                target = %target,
                "Dropping frame for unknown recipient"
            );
        }
    }

    fn detach(&self, room: &RoomId, client: &ClientId) {
        if self.members.remove(client).is_none() {
            return;
        }

        if let Some(mut ids) = self.rooms.get_mut(room) {
            ids.retain(|id| id != client);
        }
        self.rooms.remove_if(room, |_, ids| ids.is_empty());

        tracing::debug!(room = %room, client_id = %client, "Client detached");
    }

    fn client_ids(&self, room: &RoomId) -> Vec<ClientId> {
        self.rooms
            .get(room)
            .map(|ids| ids.value().clone())
            .unwrap_or_default()
    }
}
