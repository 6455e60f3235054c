//! Mapping decoded responses onto server gauges.

use fpx_core::{PlayerRoster, ServerSnapshot};
use fpx_metrics::ServerMetric;

/// Gauge readings for a `serverinfo` snapshot.
///
/// Numbers pass through unchanged; the restart flag becomes exactly 0 or 1.
pub fn snapshot_values(s: &ServerSnapshot) -> [(ServerMetric, f64); 12] {
    [
        (ServerMetric::Players, s.players as f64),
        (ServerMetric::PlayersQueued, s.queued as f64),
        (ServerMetric::PlayersJoining, s.joining as f64),
        (ServerMetric::MaxPlayers, s.max_players as f64),
        (ServerMetric::EntityCount, s.entity_count as f64),
        (ServerMetric::Uptime, s.uptime as f64),
        (ServerMetric::Framerate, s.framerate),
        (ServerMetric::Memory, s.memory as f64),
        (ServerMetric::Collections, s.collections as f64),
        (ServerMetric::NetworkIn, s.network_in as f64),
        (ServerMetric::NetworkOut, s.network_out as f64),
        (ServerMetric::Restarting, if s.restarting { 1.0 } else { 0.0 }),
    ]
}

/// Gauge readings for a `players` listing.
pub fn roster_values(roster: &PlayerRoster) -> [(ServerMetric, f64); 1] {
    [(ServerMetric::Players, roster.count() as f64)]
}
