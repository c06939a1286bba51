//! WebSocket Gateway Tests
//!
//! Room membership, heartbeat enforcement, relay and shutdown against a
//! running server.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{protocol::frame::coding::CloseCode, Error, Message};

use crate::common::{room, TestApp, WsSource, MARGIN_MS, TTL_MS};

/// Read until the connection ends, returning every message seen.
async fn drain(mut source: WsSource) -> Vec<Message> {
    let mut seen = Vec::new();
    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(message)) = source.next().await {
            seen.push(message);
        }
    })
    .await;
    assert!(drained.is_ok(), "Connection was never closed");
    seen
}

#[tokio::test]
async fn test_connection_joins_room_from_path() {
    let app = TestApp::spawn().await;

    let (first, _sink_a, _source_a) = app.join("/abc").await;
    let (second, _sink_b, _source_b) = app.join("/abc").await;

    assert_ne!(first, second);
    assert_eq!(
        app.synchronizer.client_ids(&room("/abc")),
        vec![first, second]
    );
    assert!(app.synchronizer.client_ids(&room("/ABC")).is_empty());
}

#[tokio::test]
async fn test_client_close_detaches_member() {
    let app = TestApp::spawn().await;
    let abc = room("/abc");

    let (_stay, _sink_a, _source_a) = app.join("/abc").await;
    let (leave, mut sink, source) = app.join("/abc").await;

    sink.send(Message::Close(None)).await.unwrap();
    let seen = drain(source).await;
    assert!(
        seen.iter().any(|m| matches!(m, Message::Close(_))),
        "Close was not answered, saw {:?}",
        seen
    );

    let ids = app.wait_for_members(&abc, |ids| ids.len() == 1).await;
    assert!(!ids.contains(&leave));
}

#[tokio::test]
async fn test_upgrade_without_room_is_forbidden() {
    let app = TestApp::spawn().await;

    let err = connect_async(app.ws_url("/")).await.unwrap_err();
    match err {
        Error::Http(response) => assert_eq!(response.status().as_u16(), 403),
        other => panic!("Expected HTTP rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upgrade_with_oversized_room_is_forbidden() {
    let app = TestApp::spawn().await;
    let path = format!("/{}", "r".repeat(129));

    let err = connect_async(app.ws_url(&path)).await.unwrap_err();
    assert!(matches!(err, Error::Http(ref response) if response.status().as_u16() == 403));
}

#[tokio::test]
async fn test_silent_client_is_terminated_without_close_frame() {
    let app = TestApp::spawn().await;
    let abc = room("/abc");

    // Never polled, so pings are never answered.
    let (silent, _sink, source) = app.join("/abc").await;

    tokio::time::sleep(Duration::from_millis(TTL_MS + MARGIN_MS)).await;
    let ids = app.wait_for_members(&abc, |ids| ids.is_empty()).await;
    assert!(!ids.contains(&silent));

    let seen = drain(source).await;
    assert!(seen.iter().any(|m| matches!(m, Message::Ping(_))));
    assert!(!seen.iter().any(|m| matches!(m, Message::Close(_))));
}

#[tokio::test]
async fn test_responsive_client_stays_connected() {
    let app = TestApp::spawn().await;
    let abc = room("/abc");

    let (client, _sink, mut source) = app.join("/abc").await;

    // Reading lets the client answer every ping with a pong.
    let mut pings = 0;
    let read = tokio::time::timeout(Duration::from_millis(TTL_MS * 5), async {
        while let Some(Ok(message)) = source.next().await {
            if matches!(message, Message::Ping(_)) {
                pings += 1;
            }
        }
    })
    .await;

    assert!(read.is_err(), "Connection ended while answering pings");
    assert!(pings > 0);
    assert_eq!(app.synchronizer.client_ids(&abc), vec![client]);
}

#[tokio::test]
async fn test_stalled_reader_is_terminated_while_frames_are_relayed() {
    let app = TestApp::spawn().await;
    let abc = room("/abc");

    // Never polled: its receive buffer fills up and writes to it block.
    let (stalled, _stalled_sink, _stalled_source) = app.join("/abc").await;
    let (_talker, mut sink, _source) = app.join("/abc").await;

    let payload = format!("\n{}", "x".repeat(200_000));
    let flood = tokio::spawn(async move {
        for _ in 0..300 {
            if sink.send(Message::text(payload.clone())).await.is_err() {
                break;
            }
        }
    });

    tokio::time::sleep(Duration::from_millis(TTL_MS + MARGIN_MS)).await;
    let ids = app
        .wait_for_members(&abc, |ids| !ids.contains(&stalled))
        .await;

    assert!(!ids.contains(&stalled));
    flood.abort();
}

#[tokio::test]
async fn test_frames_are_relayed_within_room() {
    let app = TestApp::spawn().await;

    let (sender, mut sink_a, _source_a) = app.join("/abc").await;
    let (_receiver, _sink_b, mut source_b) = app.join("/abc").await;

    sink_a.send(Message::text("\nhello")).await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match source_b.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
                Some(Ok(_)) => continue,
                other => panic!("Connection ended early: {:?}", other),
            }
        }
    })
    .await
    .expect("Relayed frame never arrived");

    assert_eq!(received, format!("{}\nhello", sender));
}

#[tokio::test]
async fn test_shutdown_closes_connections_with_going_away() {
    let app = TestApp::spawn().await;
    let (_client, _sink, source) = app.join("/abc").await;

    app.shutdown.shutdown();

    let seen = drain(source).await;
    let close = seen.iter().find_map(|m| match m {
        Message::Close(frame) => Some(frame.clone()),
        _ => None,
    });
    let frame = close.flatten().expect("No close frame received");
    assert_eq!(frame.code, CloseCode::Away);

    app.wait_for_members(&room("/abc"), |ids| ids.is_empty()).await;
}
