//! WebSocket Connection Handler
//!
//! Upgrade negotiation and the per-connection lifecycle: room attachment,
//! heartbeat enforcement, data relay and teardown.

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        FromRequestParts, Request, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use tokio::sync::mpsc;

use super::connection::{format_client_ids, ConnectionContext, Teardown};
use super::messages::frame_from_message;
use super::writer::ConnectionWriter;
use crate::application::services::{HeartbeatEvent, HeartbeatMonitor};
use crate::domain::{Frame, RoomId};
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::request_url;
use crate::shared::error::AppError;
use crate::startup::{shutdown_requested, AppState};

/// Route an upgrade request to its room, then complete the handshake.
///
/// Rejected requests get a bare `403 Forbidden` and the handshake is never
/// completed, so no connection ever exists for them.
pub async fn handle_upgrade_request(state: AppState, request: Request) -> Response {
    let room = match state.router.resolve_room(request.uri().path()) {
        Ok(room) => room,
        Err(err) => {
            metrics::record_upgrade_rejection(err.reason());
            tracing::warn!(
                path = %request.uri().path(),
                error = %err,
                "Upgrade rejected"
            );
            return AppError::from(err).into_response();
        }
    };

    let url = request_url(request.headers(), request.uri());
    let (mut parts, _body) = request.into_parts();

    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!(url = %url, error = %rejection, "Handshake refused");
            return rejection.into_response();
        }
    };

    let settings = &state.settings.websocket;
    ws.max_message_size(settings.max_message_size)
        .max_frame_size(settings.max_frame_size)
        .on_upgrade(move |socket| on_connection_established(socket, room, url, state))
}

/// Drive one established connection until it closes or is terminated.
///
/// The room id was validated during the upgrade and is not checked again.
pub async fn on_connection_established(
    socket: WebSocket,
    room: RoomId,
    url: String,
    state: AppState,
) {
    // Armed before the first inbound frame is read.
    let mut monitor = HeartbeatMonitor::arm(state.heartbeat);

    let (outbound_tx, outbound_rx) =
        mpsc::channel::<Frame>(state.settings.websocket.outbound_queue_capacity);
    let client_id = state.synchronizer.attach(&room, outbound_tx);
    let ctx = ConnectionContext {
        client_id,
        room,
        url,
    };

    metrics::record_connection_opened();
    let members = state.synchronizer.client_ids(&ctx.room);
    tracing::info!(
        url = %ctx.url,
        room = %ctx.room,
        client_id = %ctx.client_id,
        count = members.len(),
        clients = %format_client_ids(&members),
        "CONNECTED"
    );

    let (sink, mut stream) = socket.split();
    // Every write happens on the writer task; this loop never awaits one.
    let writer = ConnectionWriter::spawn(sink, outbound_rx);
    let stopped = shutdown_requested(state.shutdown.clone());
    tokio::pin!(stopped);

    let teardown = loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Pong(_))) => {
                    monitor.on_liveness_signal();
                    tracing::trace!(client_id = %ctx.client_id, "Pong received");
                }
                // The protocol layer queues the pong reply itself.
                Some(Ok(Message::Ping(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|f| f.code).unwrap_or(close_code::STATUS);
                    break Teardown::Closed { code };
                }
                Some(Ok(message)) => {
                    if let Some(frame) = frame_from_message(message) {
                        tracing::trace!(
                            client_id = %ctx.client_id,
                            len = frame.len(),
                            "Frame received"
                        );
                        state.synchronizer.receive(&ctx.room, &ctx.client_id, frame);
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(client_id = %ctx.client_id, error = %e, "WebSocket error");
                    break Teardown::Dropped;
                }
                None => break Teardown::Dropped,
            },

            event = monitor.next_event() => match event {
                HeartbeatEvent::Ping => {
                    if !writer.ping() {
                        tracing::trace!(
                            client_id = %ctx.client_id,
                            "Writer not ready, ping skipped"
                        );
                    }
                }
                HeartbeatEvent::Expired => {
                    tracing::warn!(
                        client_id = %ctx.client_id,
                        room = %ctx.room,
                        "Heartbeat timeout, terminating connection"
                    );
                    break Teardown::Terminated;
                }
            },

            _ = &mut stopped => break Teardown::Shutdown,
        }
    };

    let released = monitor.disarm();
    debug_assert!(released, "heartbeat monitor disarmed more than once");

    match teardown {
        Teardown::Closed { .. } => writer.close(None).await,
        Teardown::Shutdown => {
            writer
                .close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: "Server shutting down".into(),
                }))
                .await
        }
        // No close handshake: dropping both halves closes the TCP stream.
        Teardown::Dropped | Teardown::Terminated => writer.abort().await,
    }
    drop(stream);

    state.synchronizer.detach(&ctx.room, &ctx.client_id);
    metrics::record_connection_closed(teardown.outcome());

    let members = state.synchronizer.client_ids(&ctx.room);
    tracing::info!(
        url = %ctx.url,
        room = %ctx.room,
        client_id = %ctx.client_id,
        code = teardown.close_code(),
        count = members.len(),
        clients = %format_client_ids(&members),
        "CLOSED"
    );
}
