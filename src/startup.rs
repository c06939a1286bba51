//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::application::services::{HeartbeatPolicy, RoomRouter};
use crate::config::Settings;
use crate::domain::RoomSynchronizer;
use crate::infrastructure::synchronizer::RelaySynchronizer;
use crate::presentation::http::routes;

/// How long open connections get to finish their close handshake.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub synchronizer: Arc<dyn RoomSynchronizer>,
    pub router: RoomRouter,
    pub heartbeat: HeartbeatPolicy,
    /// Flips to `true` once the server starts shutting down.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        synchronizer: Arc<dyn RoomSynchronizer>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            heartbeat: HeartbeatPolicy::from_settings(&settings.heartbeat),
            router: RoomRouter::new(),
            settings: Arc::new(settings),
            synchronizer,
            shutdown,
        }
    }
}

/// Triggers a graceful shutdown of a running [`Application`].
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Stop accepting connections and close open ones with 1001.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Resolve once the server starts shutting down.
///
/// Pends forever if the sender is dropped without ever signalling.
pub async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|stopping| *stopping).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    metrics: Option<(TcpListener, Router)>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    synchronizer: Arc<dyn RoomSynchronizer>,
}

impl Application {
    /// Build the application from settings, with the in-memory relay.
    pub async fn build(settings: Settings) -> Result<Self> {
        let synchronizer: Arc<dyn RoomSynchronizer> = Arc::new(RelaySynchronizer::new());
        Self::build_with_synchronizer(settings, synchronizer).await
    }

    /// Build the application around a caller-provided synchronizer.
    pub async fn build_with_synchronizer(
        settings: Settings,
        synchronizer: Arc<dyn RoomSynchronizer>,
    ) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let metrics_port = settings.metrics.port;
        let host = settings.server.host.clone();
        let addr = settings.server_addr();

        tracing::info!(
            ttl_ms = settings.heartbeat.ttl_ms,
            margin_ms = settings.heartbeat.margin_ms,
            "Heartbeat configured"
        );

        let state = AppState::new(settings, synchronizer.clone(), shutdown_rx);
        let router = routes::create_router(state);

        // Bind to address
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);

        let metrics = match metrics_port {
            Some(port) => {
                let listener = TcpListener::bind((host.as_str(), port)).await?;
                tracing::info!("Metrics on http://{}/metrics", listener.local_addr()?);
                Some((listener, routes::metrics_router()))
            }
            None => None,
        };

        Ok(Self {
            listener,
            router,
            metrics,
            shutdown_tx: Arc::new(shutdown_tx),
            synchronizer,
        })
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Synchronizer shared by every connection of this application.
    pub fn synchronizer(&self) -> Arc<dyn RoomSynchronizer> {
        self.synchronizer.clone()
    }

    /// Handle that stops the server from elsewhere.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Run the server until ctrl-c, SIGTERM or a [`ShutdownHandle`] stops it.
    pub async fn run_until_stopped(self) -> Result<()> {
        let Self {
            listener,
            router,
            metrics,
            shutdown_tx,
            ..
        } = self;

        if let Some((listener, router)) = metrics {
            let stopped = shutdown_requested(shutdown_tx.subscribe());
            tokio::spawn(async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(stopped)
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Metrics listener failed");
                }
            });
        }

        let stopped = shutdown_requested(shutdown_tx.subscribe());
        let signal_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_tx.send_replace(true);
        });

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                stopped.await;
                tracing::info!("Shutting down");
            })
            .await?;

        // Upgraded connections outlive `serve`; each holds a receiver until
        // it has sent its close frame and detached.
        if tokio::time::timeout(SHUTDOWN_GRACE, shutdown_tx.closed())
            .await
            .is_err()
        {
            tracing::warn!("Connections still open after shutdown grace period");
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
