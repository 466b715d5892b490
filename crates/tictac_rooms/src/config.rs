//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime settings for the room server.
///
/// Loaded from an optional TOML file; every field has a default so an empty
/// file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Seconds between liveness sweeps.
    #[serde(default = "default_heartbeat_secs")]
    heartbeat_secs: u64,

    /// Seconds an empty room survives before deletion.
    #[serde(default = "default_room_grace_secs")]
    room_grace_secs: u64,

    /// Display names longer than this are truncated.
    #[serde(default = "default_max_name_len")]
    max_name_len: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7777
}

fn default_heartbeat_secs() -> u64 {
    30
}

fn default_room_grace_secs() -> u64 {
    60
}

fn default_max_name_len() -> usize {
    48
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            heartbeat_secs: default_heartbeat_secs(),
            room_grace_secs: default_room_grace_secs(),
            max_name_len: default_max_name_len(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Resolves the effective configuration: defaults, then the file (if
    /// given), then the `PORT` environment variable.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT '{}': {}", port, e)))?;
            debug!(port = config.port, "Port taken from environment");
        }

        Ok(config)
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the empty-room grace period.
    pub fn with_room_grace(mut self, grace: Duration) -> Self {
        self.room_grace_secs = grace.as_secs();
        self
    }

    /// Interval between liveness sweeps.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    /// Grace period before an empty room is deleted.
    pub fn room_grace(&self) -> Duration {
        Duration::from_secs(self.room_grace_secs)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to serialize config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
