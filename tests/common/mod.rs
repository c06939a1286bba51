//! Common Test Utilities
//!
//! Spawns a real gateway on an ephemeral port with short heartbeat timings.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::StreamExt;
use room_gateway::application::services::RoomRouter;
use room_gateway::config::Settings;
use room_gateway::domain::{ClientId, RoomId, RoomSynchronizer};
use room_gateway::startup::{Application, ShutdownHandle};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsSink = SplitSink<WsStream, Message>;
pub type WsSource = SplitStream<WsStream>;

pub const TTL_MS: u64 = 200;
pub const MARGIN_MS: u64 = 100;

/// A running gateway.
pub struct TestApp {
    pub addr: SocketAddr,
    pub synchronizer: Arc<dyn RoomSynchronizer>,
    pub shutdown: ShutdownHandle,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let settings: Settings = Settings::builder("test")
            .unwrap()
            .set_override("server.host", "127.0.0.1")
            .unwrap()
            .set_override("server.port", 0_i64)
            .unwrap()
            .set_override("heartbeat.ttl_ms", TTL_MS as i64)
            .unwrap()
            .set_override("heartbeat.margin_ms", MARGIN_MS as i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let app = Application::build(settings)
            .await
            .expect("Failed to build application");
        let addr = app.local_addr().unwrap();
        let synchronizer = app.synchronizer();
        let shutdown = app.shutdown_handle();

        tokio::spawn(app.run_until_stopped());

        Self {
            addr,
            synchronizer,
            shutdown,
        }
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Connect to a room and wait until the server has attached the client.
    pub async fn join(&self, path: &str) -> (ClientId, WsSink, WsSource) {
        let room = room(path);
        let before = self.synchronizer.client_ids(&room);

        let (stream, response) = connect_async(self.ws_url(path))
            .await
            .expect("Failed to connect");
        assert_eq!(response.status().as_u16(), 101);

        let ids = self
            .wait_for_members(&room, |ids| ids.len() == before.len() + 1)
            .await;
        let client_id = ids
            .into_iter()
            .find(|id| !before.contains(id))
            .expect("New client not attached");

        let (sink, source) = stream.split();
        (client_id, sink, source)
    }

    /// Poll membership until `done` holds or two seconds pass.
    pub async fn wait_for_members<F>(&self, room: &RoomId, done: F) -> Vec<ClientId>
    where
        F: Fn(&[ClientId]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let ids = self.synchronizer.client_ids(room);
            if done(&ids) {
                return ids;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "Membership of {} never settled, last seen {:?}",
                room,
                ids
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub fn room(path: &str) -> RoomId {
    RoomRouter::new().resolve_room(path).unwrap()
}
