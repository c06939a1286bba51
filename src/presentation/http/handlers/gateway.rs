//! Gateway Entry Handlers
//!
//! Every request, whatever its path, lands here and is split into the plain
//! HTTP branch or the WebSocket upgrade branch.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::infrastructure::metrics;
use crate::presentation::http::extractors::{is_upgrade_request, request_url};
use crate::presentation::websocket::handle_upgrade_request;
use crate::startup::AppState;

/// Fallback handler for the whole router.
pub async fn handle_request(State(state): State<AppState>, request: Request) -> Response {
    if is_upgrade_request(request.headers()) {
        return handle_upgrade_request(state, request).await;
    }

    handle_http_request(&state, &request)
}

/// Answer a request that did not ask for an upgrade.
///
/// `/` redirects to the informational location; every other path is told to
/// upgrade. Bodies are always empty.
pub fn handle_http_request(state: &AppState, request: &Request) -> Response {
    let response = if request.uri().path() == "/" {
        (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, state.settings.routing.redirect_url.as_str())],
        )
            .into_response()
    } else {
        (
            StatusCode::UPGRADE_REQUIRED,
            [(header::CONNECTION, "Upgrade"), (header::UPGRADE, "websocket")],
        )
            .into_response()
    };

    let status = response.status().as_u16();
    metrics::record_http_request(request.method().as_str(), status);
    tracing::info!(
        method = %request.method(),
        url = %request_url(request.headers(), request.uri()),
        status = status,
        "HTTP request completed"
    );

    response
}
