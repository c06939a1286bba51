//! Room Router
//!
//! Derives the room id from an upgrade request path.

use validator::{Validate, ValidationError};

use crate::domain::RoomId;
use crate::shared::error::RoutingError;
use crate::shared::validation::validation_error;

/// Longest accepted room id, in characters. Kept in sync with `RoomPath`.
pub const MAX_ROOM_ID_LENGTH: u64 = 128;

/// Candidate room id taken from the path.
#[derive(Debug, Validate)]
struct RoomPath {
    #[validate(
        length(max = 128, message = "Room id must be at most 128 characters"),
        custom(function = "validate_no_control_chars")
    )]
    id: String,
}

fn validate_no_control_chars(id: &str) -> Result<(), ValidationError> {
    if id.chars().any(|c| c.is_control()) {
        let mut error = ValidationError::new("control_characters");
        error.message = Some("Room id must not contain control characters".into());
        return Err(error);
    }
    Ok(())
}

/// Maps request paths to rooms.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomRouter;

impl RoomRouter {
    pub fn new() -> Self {
        Self
    }

    /// Strip the leading `/` and validate what remains.
    ///
    /// The path must not carry a query string; pass `Uri::path()`. Anything
    /// after the first slash is kept verbatim, including further slashes and
    /// percent escapes.
    pub fn resolve_room(&self, request_path: &str) -> Result<RoomId, RoutingError> {
        let id = request_path.strip_prefix('/').unwrap_or(request_path);

        if id.is_empty() {
            return Err(RoutingError::NoRoomSpecified);
        }

        RoomPath { id: id.to_owned() }
            .validate()
            .map_err(validation_error)?;

        Ok(RoomId::new_unchecked(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/abc", "abc" ; "simple room")]
    #[test_case("/ABC", "ABC" ; "case is preserved")]
    #[test_case("/a/b", "a/b" ; "nested segments are kept")]
    #[test_case("/caf%C3%A9", "caf%C3%A9" ; "percent escapes are kept")]
    #[test_case("//", "/" ; "double slash")]
    fn test_resolves_room(path: &str, expected: &str) {
        let room = RoomRouter::new().resolve_room(path).unwrap();
        assert_eq!(room.as_str(), expected);
    }

    #[test_case("/" ; "root")]
    #[test_case("" ; "empty")]
    fn test_rejects_missing_room(path: &str) {
        assert_eq!(
            RoomRouter::new().resolve_room(path),
            Err(RoutingError::NoRoomSpecified)
        );
    }

    #[test]
    fn test_rejects_oversized_room() {
        let path = format!("/{}", "x".repeat(MAX_ROOM_ID_LENGTH as usize + 1));
        let err = RoomRouter::new().resolve_room(&path).unwrap_err();

        assert!(matches!(err, RoutingError::InvalidRoomId(_)));
        assert_eq!(err.reason(), "invalid_room");
    }

    #[test]
    fn test_accepts_room_at_length_limit() {
        let path = format!("/{}", "x".repeat(MAX_ROOM_ID_LENGTH as usize));
        assert!(RoomRouter::new().resolve_room(&path).is_ok());
    }

    #[test]
    fn test_rejects_control_characters() {
        let err = RoomRouter::new().resolve_room("/room\u{7f}").unwrap_err();
        assert_eq!(
            err,
            RoutingError::InvalidRoomId(
                "id: Room id must not contain control characters".into()
            )
        );
    }
}
