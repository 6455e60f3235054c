//! fpx-core: shared types for the Facepunch Rust exporter.
//!
//! Holds the decoded shapes of the game server's status responses, the
//! tolerant decoders that produce them, and the exporter configuration.

pub mod config;
pub mod parse;
pub mod types;

pub use config::{ConfigError, ExporterConfig, LogFormat, parse_duration};
pub use parse::{Decoded, parse_build_info, parse_player_roster, parse_server_info};
pub use types::*;
