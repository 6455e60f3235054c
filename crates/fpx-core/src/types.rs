//! Shared types used across exporter crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Decoded `serverinfo` response.
///
/// Built fresh on every scrape and dropped once its fields have been
/// turned into samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSnapshot {
    pub hostname: String,
    pub map: String,
    pub game_time: String,
    pub save_created_time: String,
    pub players: i64,
    pub queued: i64,
    pub joining: i64,
    pub max_players: i64,
    pub entity_count: i64,
    pub uptime: i64,
    pub framerate: f64,
    pub memory: i64,
    pub collections: i64,
    pub network_in: i64,
    pub network_out: i64,
    pub restarting: bool,
}

/// Decoded `buildinfo` response: identifies the running server binary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildFingerprint {
    /// Build time, seconds since the Unix epoch.
    pub date: i64,
    pub build_id: String,
    pub build_number: String,
    pub build_tag: String,
    pub build_url: String,
    pub build_name: String,
    pub build_node: String,
    pub valid: bool,
    pub scm_type: String,
    pub scm_change_id: String,
    pub scm_branch: String,
    pub scm_repo: String,
    pub scm_comment: String,
    pub scm_author: String,
    pub scm_date: String,
}

/// Decoded `players` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRoster {
    /// One entry per connected player line, header excluded.
    pub entries: Vec<String>,
}

impl PlayerRoster {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// Which command feeds the player/server gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// Structured `serverinfo`: the full gauge catalog.
    #[default]
    ServerInfo,
    /// Line-oriented `players` listing: only the `players` gauge.
    Players,
}

impl SnapshotSource {
    /// Remote command issued for this source.
    pub fn command(&self) -> &'static str {
        match self {
            SnapshotSource::ServerInfo => "serverinfo",
            SnapshotSource::Players => "players",
        }
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for SnapshotSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serverinfo" => Ok(SnapshotSource::ServerInfo),
            "players" => Ok(SnapshotSource::Players),
            other => Err(format!("unknown snapshot source: {other}")),
        }
    }
}

/// Exporter build metadata, baked in at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit_sha: String,
    pub date: String,
}

impl BuildInfo {
    /// Metadata of the binary currently running.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit_sha: option_env!("FPX_BUILD_COMMIT").unwrap_or("unknown").to_string(),
            date: option_env!("FPX_BUILD_DATE").unwrap_or("unknown").to_string(),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_source_commands() {
        assert_eq!(SnapshotSource::ServerInfo.command(), "serverinfo");
        assert_eq!(SnapshotSource::Players.command(), "players");
    }

    #[test]
    fn snapshot_source_from_str() {
        assert_eq!("serverinfo".parse(), Ok(SnapshotSource::ServerInfo));
        assert_eq!(" Players ".parse(), Ok(SnapshotSource::Players));
        assert!("status".parse::<SnapshotSource>().is_err());
    }

    #[test]
    fn roster_count() {
        let roster = PlayerRoster {
            entries: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(roster.count(), 2);
        assert_eq!(PlayerRoster::default().count(), 0);
    }

    #[test]
    fn build_info_has_version() {
        assert!(!BuildInfo::current().version.is_empty());
    }
}
