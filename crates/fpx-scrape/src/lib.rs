//! fpx-scrape: turns one pull into one RCON scrape cycle.
//!
//! # Architecture
//!
//! ```text
//! ScrapeCoordinator::collect_into(sink)
//!   ├── lock (one cycle in flight per coordinator)
//!   ├── Connector::connect()            → connect time gauge
//!   ├── buildinfo                       → label vector (may be empty)
//!   ├── serverinfo | players            → server gauges
//!   ├── ControlLink::close()            ← on every path once connected
//!   └── up / error / duration / totals  → meta metrics
//!
//! TargetDispatcher::handle(target)
//!   └── fresh ScrapeCoordinator + private MetricBuffer, one cycle
//! ```

pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod mapping;

#[cfg(test)]
mod testing;

pub use coordinator::{ScrapeCoordinator, ScrapeOptions, ScrapePhase};
pub use dispatcher::TargetDispatcher;
pub use error::{DispatchError, ScrapeError};
pub use mapping::snapshot_values;
