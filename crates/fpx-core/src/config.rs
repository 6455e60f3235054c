//! Exporter configuration.
//!
//! Values come from built-in defaults, an optional TOML file, and finally
//! command-line flags / environment variables applied by the binary.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SnapshotSource;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid listen address: {0}")]
    ListenAddress(String),

    #[error("invalid metrics path: {0}")]
    MetricsPath(String),

    #[error("invalid namespace: {0}")]
    Namespace(String),

    #[error("invalid duration: {0}")]
    Duration(String),
}

/// Log output format for the daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// WebRCON address of the game server (`host:port`). Empty disables scraping.
    pub rust_addr: String,
    /// WebRCON password.
    pub rust_password: String,
    /// Address the HTTP server binds to.
    pub listen_address: String,
    /// Path serving the process-wide scrape.
    pub metrics_path: String,
    /// Prefix prepended to every metric name.
    pub namespace: String,
    #[serde(with = "duration_str")]
    pub connect_timeout: Duration,
    #[serde(with = "duration_str")]
    pub command_timeout: Duration,
    pub snapshot_source: SnapshotSource,
    pub log_format: LogFormat,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            rust_addr: "localhost:28016".to_string(),
            rust_password: String::new(),
            listen_address: "0.0.0.0:9121".to_string(),
            metrics_path: "/metrics".to_string(),
            namespace: String::new(),
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
            snapshot_source: SnapshotSource::ServerInfo,
            log_format: LogFormat::Text,
        }
    }
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ExporterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Normalise and check the configuration.
    ///
    /// An empty metrics path falls back to `/metrics`.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.metrics_path.is_empty() {
            self.metrics_path = "/metrics".to_string();
        }
        if !self.metrics_path.starts_with('/') {
            return Err(ConfigError::MetricsPath(self.metrics_path));
        }
        // Route segments may not start with ':' or carry '{' / '}'.
        if self
            .metrics_path
            .split('/')
            .any(|seg| seg.starts_with(':') || seg.contains(['{', '}']))
        {
            return Err(ConfigError::MetricsPath(format!(
                "{} contains a route parameter",
                self.metrics_path
            )));
        }
        if matches!(self.metrics_path.as_str(), "/" | "/scrape" | "/health") {
            return Err(ConfigError::MetricsPath(format!(
                "{} is reserved",
                self.metrics_path
            )));
        }
        self.listen_socket_addr()?;
        if !self
            .namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
            || self.namespace.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(ConfigError::Namespace(self.namespace));
        }
        if self.connect_timeout.is_zero() || self.command_timeout.is_zero() {
            return Err(ConfigError::Duration("timeouts must be non-zero".to_string()));
        }
        Ok(self)
    }

    pub fn listen_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        // ":9121" binds every interface.
        let addr = match self.listen_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.listen_address.clone(),
        };
        addr.parse()
            .map_err(|_| ConfigError::ListenAddress(self.listen_address.clone()))
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        if d.subsec_millis() != 0 {
            s.serialize_str(&format!("{}ms", d.as_millis()))
        } else {
            s.serialize_str(&format!("{}s", d.as_secs()))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_duration(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {raw}")))
    }
}
