//! Transport traits for the control link.
//!
//! The scrape coordinator only sees these traits, so tests can swap the
//! WebSocket implementation for a scripted one.

use std::future::Future;
use std::pin::Pin;

use crate::error::RconResult;

/// Boxed future alias for connector results.
pub type ConnectFuture<'a> =
    Pin<Box<dyn Future<Output = RconResult<Box<dyn ControlLink>>> + Send + 'a>>;

/// Boxed future alias for a single command's response text.
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = RconResult<String>> + Send + 'a>>;

/// One authenticated connection to a server's control interface.
///
/// Commands are strictly sequential: callers await each `execute` before
/// issuing the next one.
pub trait ControlLink: Send + std::fmt::Debug {
    /// Send `command` and wait for its response.
    fn execute<'a>(&'a mut self, command: &'a str) -> ExecuteFuture<'a>;

    /// Release the connection. Calling it again is a no-op.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Opens control links.
///
/// Every call yields an independent connection; nothing is pooled.
pub trait Connector: Send + Sync {
    fn connect<'a>(&'a self, address: &'a str, password: &'a str) -> ConnectFuture<'a>;
}
