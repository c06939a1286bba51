//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Heartbeat timing
    pub heartbeat: HeartbeatSettings,

    /// Non-upgrade HTTP routing
    pub routing: RoutingSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Optional admin listener for Prometheus metrics
    #[serde(default)]
    pub metrics: MetricsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatSettings {
    /// Ping period in milliseconds (default: 10000)
    pub ttl_ms: u64,

    /// Extra delay on top of the TTL before a silent client is terminated (default: 1000)
    pub margin_ms: u64,
}

/// Plain HTTP routing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSettings {
    /// Location advertised by the 301 on the root path
    pub redirect_url: String,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 1MB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 256KB)
    pub max_frame_size: usize,

    /// Frames queued per connection before new ones are dropped (default: 64)
    pub outbound_queue_capacity: usize,
}

/// Metrics listener configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsSettings {
    /// Port for the `/metrics` listener; disabled when unset
    pub port: Option<u16>,
}

/// Default listening port when `PORT` is not provided.
pub const DEFAULT_PORT: u16 = 5000;

/// Default informational location for `GET /`.
pub const DEFAULT_REDIRECT_URL: &str = "https://github.com/haggen/tinysync";

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed
    /// (for example a non-numeric `PORT`), or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=5000 -> server.port = 5000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", non_empty_var("HOST"))?
            .set_override_option("server.port", non_empty_var("PORT"))?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate().map(|_| settings))
    }

    /// Builder pre-populated with every default value.
    pub fn builder(
        environment: &str,
    ) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("heartbeat.ttl_ms", 10_000_i64)?
            .set_default("heartbeat.margin_ms", 1_000_i64)?
            .set_default("routing.redirect_url", DEFAULT_REDIRECT_URL)?
            .set_default("websocket.max_message_size", 1_048_576_i64)? // 1MB
            .set_default("websocket.max_frame_size", 262_144_i64)? // 256KB
            .set_default("websocket.outbound_queue_capacity", 64_i64)
    }

    /// Reject values that deserialize but cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat.ttl_ms == 0 {
            return Err(ConfigError::Message(
                "heartbeat.ttl_ms must be greater than zero".into(),
            ));
        }

        if self.websocket.outbound_queue_capacity == 0 {
            return Err(ConfigError::Message(
                "websocket.outbound_queue_capacity must be greater than zero".into(),
            ));
        }

        if self.metrics.port.is_some_and(|port| port == self.server.port && port != 0) {
            return Err(ConfigError::Message(format!(
                "metrics.port must differ from server.port ({})",
                self.server.port
            )));
        }

        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
