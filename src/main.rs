//! # Room Gateway
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading (an invalid `PORT` aborts here, before binding)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use room_gateway::config::Settings;
use room_gateway::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    room_gateway::telemetry::init_tracing();

    info!("Starting Room Gateway...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
