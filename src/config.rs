//! Configuration management for the RIFT file server
//!
//! Loads settings from an optional `config.toml` with `RIFT_*` environment
//! variable overrides, validated before the server starts.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Complete server configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    pub bind_address: String,

    /// TCP port for client connections (0 picks an ephemeral port)
    pub port: u16,

    /// Root directory holding all client namespaces
    pub storage_root: String,

    /// Maximum number of concurrently active sessions; connections beyond
    /// this are refused with 503 before any handshake
    pub max_sessions: usize,

    /// Per-connection receive timeout in seconds
    pub recv_timeout_secs: u64,

    /// Frame size used when streaming file content
    pub chunk_size: usize,

    /// Largest command/status frame the server will accept
    pub command_frame_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 9090,
            storage_root: "./storage".to_string(),
            max_sessions: 8,
            recv_timeout_secs: 120,
            chunk_size: 1024,
            command_frame_limit: 512,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment
    /// overrides, falling back to defaults for missing values.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RIFT"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.storage_root.is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if self.max_sessions == 0 {
            return Err(config::ConfigError::Message(
                "max_sessions must be greater than 0".into(),
            ));
        }

        if self.chunk_size == 0 {
            return Err(config::ConfigError::Message(
                "chunk_size must be greater than 0".into(),
            ));
        }

        if self.command_frame_limit == 0 {
            return Err(config::ConfigError::Message(
                "command_frame_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Get receive timeout as Duration
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_secs(self.recv_timeout_secs)
    }
}
