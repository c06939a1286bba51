//! Application data frames exchanged between room members.

/// A data frame as seen by the room synchronizer.
///
/// Control frames (ping, pong, close) never reach the synchronizer; the
/// gateway consumes them for liveness and teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Frame::Text(text) => text.len(),
            Frame::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
