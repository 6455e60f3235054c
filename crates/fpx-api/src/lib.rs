//! fpx-api: HTTP surface of the Rust exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | HTML index linking to the metrics path |
//! | GET | `<metrics path>` | Scrape the configured server, Prometheus exposition |
//! | GET | `/scrape?target=<addr>` | Scrape an arbitrary server once |
//! | GET | `/health` | Liveness only |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use fpx_core::BuildInfo;
use fpx_scrape::{ScrapeCoordinator, TargetDispatcher};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<ScrapeCoordinator>,
    pub dispatcher: TargetDispatcher,
    pub metrics_path: String,
    pub build_info: BuildInfo,
}

impl ApiState {
    pub fn new(coordinator: Arc<ScrapeCoordinator>, metrics_path: &str, build_info: BuildInfo) -> Self {
        Self {
            dispatcher: TargetDispatcher::new(Arc::clone(&coordinator)),
            coordinator,
            metrics_path: metrics_path.to_string(),
            build_info,
        }
    }
}

/// Build the exporter router.
pub fn build_router(state: ApiState) -> Router {
    let metrics_path = state.metrics_path.clone();

    Router::new()
        .route("/", get(handlers::index))
        .route(&metrics_path, get(handlers::prometheus_metrics))
        .route("/scrape", get(handlers::scrape_target))
        .route("/health", get(handlers::health))
        .with_state(state)
}
