//! Request Inspection
//!
//! Helpers that read routing and logging facts out of a request head.

use axum::http::{header, HeaderMap, Uri};

/// Whether the request asks for a protocol upgrade.
///
/// True when `Connection` lists the `upgrade` token and an `Upgrade` header
/// is present. Which protocol was asked for is checked later by the
/// handshake itself.
pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
    let connection_upgrade = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));

    connection_upgrade && headers.contains_key(header::UPGRADE)
}

/// Absolute URL of the request for log lines, e.g. `ws://host/room?x=1`.
///
/// Falls back to `localhost` when the request has no `Host` header.
pub fn request_url(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost");

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("ws://{}{}", host, path_and_query)
}
