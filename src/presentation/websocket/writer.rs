//! Connection Writer
//!
//! Owns the write half of an established socket. Relayed frames, pings and
//! the closing handshake all go through this task, so a peer that stops
//! reading stalls the writer but never the heartbeat.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::ws::{CloseFrame, Message, WebSocket},
};
use futures::{stream::SplitSink, SinkExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::Frame;

/// How long the closing handshake may take before the writer is aborted.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

const CONTROL_QUEUE_CAPACITY: usize = 4;

enum Control {
    Ping,
    /// Send `Some` frame, or flush the reply to a close the peer started.
    Close(Option<CloseFrame>),
}

/// Handle to the writer task of one connection.
pub struct ConnectionWriter {
    control: mpsc::Sender<Control>,
    task: JoinHandle<()>,
}

impl ConnectionWriter {
    /// Spawn the writer. `frames` is the receiving end of the connection's
    /// outbound queue.
    pub fn spawn(sink: SplitSink<WebSocket, Message>, frames: mpsc::Receiver<Frame>) -> Self {
        let (control, control_rx) = mpsc::channel(CONTROL_QUEUE_CAPACITY);
        let task = tokio::spawn(write_loop(sink, frames, control_rx));
        Self { control, task }
    }

    /// Queue a ping without waiting.
    ///
    /// Returns `false` when the writer is backed up or has stopped after a
    /// failed write; the ping is skipped for this cycle.
    pub fn ping(&self) -> bool {
        self.control.try_send(Control::Ping).is_ok()
    }

    /// Run the closing handshake, then release the write half.
    ///
    /// With `None` only the reply to the peer's close frame is flushed.
    /// Gives up after [`CLOSE_TIMEOUT`].
    pub async fn close(self, frame: Option<CloseFrame>) {
        let Self { control, mut task } = self;

        let handshake = async {
            if control.send(Control::Close(frame)).await.is_ok() {
                let _ = (&mut task).await;
            }
        };

        if tokio::time::timeout(CLOSE_TIMEOUT, handshake).await.is_err() {
            tracing::debug!("Close handshake timed out");
            task.abort();
            let _ = task.await;
        }
    }

    /// Stop writing immediately. No close frame is sent.
    pub async fn abort(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut frames: mpsc::Receiver<Frame>,
    mut control: mpsc::Receiver<Control>,
) {
    loop {
        let message = tokio::select! {
            biased;

            command = control.recv() => match command {
                Some(Control::Ping) => Message::Ping(Bytes::new()),
                Some(Control::Close(frame)) => {
                    if let Some(frame) = frame {
                        let _ = sink.send(Message::Close(Some(frame))).await;
                    }
                    // Also writes a close reply queued by the protocol layer.
                    let _ = sink.close().await;
                    return;
                }
                None => return,
            },

            Some(frame) = frames.recv() => frame.into(),
        };

        if let Err(e) = sink.send(message).await {
            tracing::debug!(error = %e, "WebSocket write failed");
            return;
        }
    }
}
