//! Proxy configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Where the proxy listens, where it forwards to, and how much it logs.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```toml
/// bind = "0.0.0.0:8787"
/// upstream = "wss://game.example/socket"
/// log_filter = "tapline=debug,info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address the game client connects to.
    pub bind: String,

    /// WebSocket URL of the real game server.
    pub upstream: String,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is
    /// not set.
    pub log_filter: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            upstream: "ws://127.0.0.1:9000".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ProxyConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that the upstream is a WebSocket URL and the bind address is
    /// set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address is empty".into()));
        }
        if !(self.upstream.starts_with("ws://") || self.upstream.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "upstream must be a ws:// or wss:// URL, got {:?}",
                self.upstream
            )));
        }
        Ok(())
    }
}

/// Errors raised while loading a [`ProxyConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
