//! Ad-hoc scrapes of an arbitrary target.

use std::sync::Arc;

use tracing::{info, warn};

use fpx_metrics::MetricBuffer;

use crate::coordinator::ScrapeCoordinator;
use crate::error::DispatchError;

/// Runs one-off scrapes on behalf of the `/scrape` endpoint.
///
/// Each request gets its own coordinator and buffer, so nothing from an
/// ad-hoc scrape leaks into the exporter's own metrics. Rejected requests
/// are counted on the parent coordinator.
#[derive(Debug, Clone)]
pub struct TargetDispatcher {
    parent: Arc<ScrapeCoordinator>,
}

impl TargetDispatcher {
    pub fn new(parent: Arc<ScrapeCoordinator>) -> Self {
        Self { parent }
    }

    pub fn parent(&self) -> &Arc<ScrapeCoordinator> {
        &self.parent
    }

    /// Scrape `target` once with the parent's options.
    pub async fn handle(&self, target: Option<&str>) -> Result<MetricBuffer, DispatchError> {
        let target = match target.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => {
                self.parent.record_request_error();
                warn!("scrape request without target");
                return Err(DispatchError::MissingTarget);
            }
        };

        let coordinator = ScrapeCoordinator::new(target, self.parent.options().clone())
            .map_err(|e| {
                self.parent.record_request_error();
                warn!(server = %target, error = %e, "rejected scrape target");
                DispatchError::InvalidTarget(e)
            })?;

        info!(server = %target, "ad-hoc scrape");
        let mut buffer = MetricBuffer::new();
        coordinator.collect_into(&mut buffer).await;
        Ok(buffer)
    }
}
