//! Validation Utilities

use validator::ValidationErrors;

use super::error::RoutingError;

/// Convert room id validation errors to a routing error
pub fn validation_error(errors: ValidationErrors) -> RoutingError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, detail)
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".into());

    RoutingError::InvalidRoomId(message)
}
