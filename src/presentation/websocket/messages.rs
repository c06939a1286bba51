//! WebSocket Message Conversions
//!
//! Mapping between axum WebSocket messages and synchronizer frames.

use axum::extract::ws::Message;

use crate::domain::Frame;

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
        }
    }
}

/// Data payload of an inbound message, if it carries one.
///
/// Control messages return `None`; the connection loop handles them itself.
pub fn frame_from_message(message: Message) -> Option<Frame> {
    match message {
        Message::Text(text) => Some(Frame::Text(text.as_str().to_owned())),
        Message::Binary(data) => Some(Frame::Binary(data.to_vec())),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
    }
}
