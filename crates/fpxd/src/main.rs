//! fpxd: the Facepunch Rust exporter daemon.
//!
//! Serves Prometheus metrics for a Rust dedicated server. Every pull of
//! the metrics path opens a WebRCON session, reads `buildinfo` and
//! `serverinfo` (or `players`), and closes it again.
//!
//! # Usage
//!
//! ```text
//! fpxd --rust.addr 10.0.0.5:28016 --rust.password hunter2
//! RUST_ADDR=10.0.0.5:28016 RUST_EXPORTER_NAMESPACE=rust fpxd
//! ```

mod cli;

use std::sync::Arc;

use clap::Parser;
use fpx_api::{ApiState, build_router};
use fpx_core::{BuildInfo, ExporterConfig, LogFormat};
use fpx_scrape::{ScrapeCoordinator, ScrapeOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    init_tracing(config.log_format);
    run(config).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fpxd=debug,fpx_scrape=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    let build_info = BuildInfo::current();
    info!(
        version = %build_info.version,
        commit = %build_info.commit_sha,
        date = %build_info.date,
        "Rust exporter starting"
    );

    // ── Coordinator ────────────────────────────────────────────

    let options = ScrapeOptions::from_config(&config);
    let coordinator = Arc::new(ScrapeCoordinator::new(&config.rust_addr, options)?);
    debug!(rust_addr = %config.rust_addr, "configured rust addr");
    for desc in coordinator.describe() {
        debug!(metric = %desc.fq_name, kind = %desc.kind, labels = desc.label_names.len(), "metric registered");
    }

    // ── HTTP server ────────────────────────────────────────────

    let state = ApiState::new(coordinator, &config.metrics_path, build_info);
    let router = build_router(state);

    let addr = config.listen_socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, path = %config.metrics_path, "providing metrics");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    info!("Rust exporter stopped");
    Ok(())
}
