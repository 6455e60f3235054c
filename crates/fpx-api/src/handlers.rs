//! Route handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use fpx_metrics::{CONTENT_TYPE, render_text};
use serde::Deserialize;
use tracing::error;

use crate::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub target: Option<String>,
}

// ── Index / health ─────────────────────────────────────────────

/// GET /
pub async fn index(State(state): State<ApiState>) -> Html<String> {
    let version = &state.build_info.version;
    Html(format!(
        "<html>\n\
         <head><title>FacepunchRust Exporter {version}</title></head>\n\
         <body>\n\
         <h1>FacepunchRust Exporter {version}</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET <metrics path>
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let buffer = state.coordinator.collect().await;
    exposition(render_text(buffer.samples()))
}

/// GET /scrape?target=<address>
pub async fn scrape_target(
    State(state): State<ApiState>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    match state.dispatcher.handle(params.target.as_deref()).await {
        Ok(buffer) => exposition(render_text(buffer.samples())).into_response(),
        Err(e) => {
            error!(error = %e, "scrape request rejected");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

fn exposition(body: String) -> impl IntoResponse {
    (StatusCode::OK, [("content-type", CONTENT_TYPE)], body)
}
