//! fpx-rcon: control link to a Rust dedicated server.
//!
//! Speaks WebRCON: JSON text frames over a WebSocket whose URL path
//! carries the RCON password. A link is opened per scrape, used for a
//! handful of strictly sequential commands, then closed.
//!
//! # Architecture
//!
//! ```text
//! Connector (trait)            ← injected for testability
//!   └── WebRconConnector       → connect_async + timeout
//!
//! ControlLink (trait)
//!   └── WebRconLink
//!       ├── execute(cmd)       → request frame, wait for matching Identifier
//!       └── close()            → close frame, idempotent
//! ```

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod link;
pub mod websocket;

pub use error::{RconError, RconResult};
pub use link::{ConnectFuture, Connector, ControlLink, ExecuteFuture};
pub use websocket::{WebRconConnector, WebRconLink, endpoint_url};
