//! Scrape error types.

use fpx_rcon::RconError;
use thiserror::Error;

/// Errors raised by a scrape cycle or while building a coordinator.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The target address cannot be turned into a control endpoint.
    #[error("invalid target configuration: {0}")]
    Config(#[source] RconError),

    #[error("{0}")]
    Connect(#[source] RconError),

    #[error("command {command} failed: {source}")]
    Execute {
        command: String,
        #[source]
        source: RconError,
    },
}

/// Errors surfaced to the caller of an ad-hoc scrape.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("'target' parameter must be specified")]
    MissingTarget,

    #[error("{0}")]
    InvalidTarget(#[source] ScrapeError),
}
