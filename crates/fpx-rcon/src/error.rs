//! Control link error types.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for control link operations.
pub type RconResult<T> = Result<T, RconError>;

/// Errors raised while opening or using a control link.
#[derive(Debug, Error)]
pub enum RconError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("command is empty")]
    EmptyCommand,

    #[error("send failed: {0}")]
    Send(String),

    #[error("receive failed: {0}")]
    Receive(String),

    #[error("connection closed")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },
}

impl RconError {
    /// Whether the error happened before a link existed.
    pub fn is_connect(&self) -> bool {
        match self {
            RconError::InvalidAddress(_) | RconError::Connect(_) | RconError::Auth(_) => true,
            RconError::Timeout { operation, .. } => operation == "connect",
            _ => false,
        }
    }
}
