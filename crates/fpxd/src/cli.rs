//! Command-line flags and their layering over the config file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use fpx_core::{ConfigError, ExporterConfig, LogFormat, SnapshotSource, parse_duration};

#[derive(Debug, Parser)]
#[command(name = "fpxd", version, about = "Prometheus exporter for Facepunch Rust servers")]
pub struct Cli {
    /// TOML configuration file; flags and environment override it.
    #[arg(long, env = "RUST_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// WebRCON address of the server to scrape.
    #[arg(long = "rust.addr", env = "RUST_ADDR")]
    pub rust_addr: Option<String>,

    /// WebRCON password.
    #[arg(long = "rust.password", env = "RUST_PASSWORD", hide_env_values = true)]
    pub rust_password: Option<String>,

    /// Address to listen on for the web interface and telemetry.
    #[arg(long = "web.listen-address", env = "RUST_EXPORTER_WEB_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", env = "RUST_EXPORTER_WEB_TELEMETRY_PATH")]
    pub metrics_path: Option<String>,

    /// Prefix for every metric name.
    #[arg(long, env = "RUST_EXPORTER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Upper bound on opening the WebRCON connection (e.g. 5s, 500ms).
    #[arg(long, env = "RUST_EXPORTER_CONNECT_TIMEOUT")]
    pub connect_timeout: Option<String>,

    /// Upper bound on a single WebRCON command.
    #[arg(long, env = "RUST_EXPORTER_COMMAND_TIMEOUT")]
    pub command_timeout: Option<String>,

    /// Command the server gauges are read from.
    #[arg(long, env = "RUST_EXPORTER_SNAPSHOT_SOURCE", value_enum)]
    pub snapshot_source: Option<SourceArg>,

    #[arg(long, env = "RUST_EXPORTER_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormatArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Serverinfo,
    Players,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl Cli {
    /// Defaults, then the config file, then flags and environment.
    pub fn resolve(&self) -> Result<ExporterConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => ExporterConfig::from_file(path)?,
            None => ExporterConfig::default(),
        };
        self.apply(base)?.validate()
    }

    fn apply(&self, mut config: ExporterConfig) -> Result<ExporterConfig, ConfigError> {
        if let Some(v) = &self.rust_addr {
            config.rust_addr = v.clone();
        }
        if let Some(v) = &self.rust_password {
            config.rust_password = v.clone();
        }
        if let Some(v) = &self.listen_address {
            config.listen_address = v.clone();
        }
        if let Some(v) = &self.metrics_path {
            config.metrics_path = v.clone();
        }
        if let Some(v) = &self.namespace {
            config.namespace = v.clone();
        }
        if let Some(v) = &self.connect_timeout {
            config.connect_timeout = duration(v)?;
        }
        if let Some(v) = &self.command_timeout {
            config.command_timeout = duration(v)?;
        }
        if let Some(v) = self.snapshot_source {
            config.snapshot_source = match v {
                SourceArg::Serverinfo => SnapshotSource::ServerInfo,
                SourceArg::Players => SnapshotSource::Players,
            };
        }
        if let Some(v) = self.log_format {
            config.log_format = match v {
                LogFormatArg::Text => LogFormat::Text,
                LogFormatArg::Json => LogFormat::Json,
            };
        }
        Ok(config)
    }
}

fn duration(raw: &str) -> Result<std::time::Duration, ConfigError> {
    parse_duration(raw).ok_or_else(|| ConfigError::Duration(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["fpxd"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--rust.addr",
            "10.0.0.9:28016",
            "--web.telemetry-path",
            "/rust",
            "--namespace",
            "rust",
            "--command-timeout",
            "750ms",
            "--snapshot-source",
            "players",
        ])
        .resolve()
        .unwrap();

        assert_eq!(config.rust_addr, "10.0.0.9:28016");
        assert_eq!(config.metrics_path, "/rust");
        assert_eq!(config.namespace, "rust");
        assert_eq!(config.command_timeout, Duration::from_millis(750));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.snapshot_source, SnapshotSource::Players);
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "rust_addr = \"file-host:28016\"\nnamespace = \"fromfile\"\n"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = parse(&["--config", &path, "--namespace", "flag"])
            .resolve()
            .unwrap();
        assert_eq!(config.rust_addr, "file-host:28016");
        assert_eq!(config.namespace, "flag");
    }

    #[test]
    fn bad_timeout_rejected() {
        let err = parse(&["--connect-timeout", "soon"]).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Duration(_)));
    }

    #[test]
    fn empty_metrics_path_falls_back() {
        let config = parse(&["--web.telemetry-path", ""]).resolve().unwrap();
        assert_eq!(config.metrics_path, "/metrics");
    }
}
