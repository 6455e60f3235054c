//! The fixed metric catalog.
//!
//! Built once per coordinator and never mutated afterwards; cloning a
//! schema shares its descriptors.

use std::sync::Arc;

use fpx_core::BuildFingerprint;

use crate::desc::{Desc, MetricKind};
use crate::sink::{Sample, SampleValue};

/// Label names attached to every server gauge, in projection order.
pub const BUILD_LABELS: [&str; 15] = [
    "build_date",
    "build_id",
    "build_number",
    "build_tag",
    "build_url",
    "build_name",
    "build_node",
    "build_valid",
    "build_scm_type",
    "build_scm_changeid",
    "build_scm_branch",
    "build_scm_repo",
    "build_scm_comment",
    "build_scm_author",
    "build_scm_date",
];

/// Gauges derived from the game server's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerMetric {
    Players,
    PlayersQueued,
    PlayersJoining,
    MaxPlayers,
    EntityCount,
    Uptime,
    Framerate,
    Memory,
    Collections,
    NetworkIn,
    NetworkOut,
    Restarting,
}

impl ServerMetric {
    pub const ALL: [ServerMetric; 12] = [
        ServerMetric::Players,
        ServerMetric::PlayersQueued,
        ServerMetric::PlayersJoining,
        ServerMetric::MaxPlayers,
        ServerMetric::EntityCount,
        ServerMetric::Uptime,
        ServerMetric::Framerate,
        ServerMetric::Memory,
        ServerMetric::Collections,
        ServerMetric::NetworkIn,
        ServerMetric::NetworkOut,
        ServerMetric::Restarting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServerMetric::Players => "players",
            ServerMetric::PlayersQueued => "players_queued",
            ServerMetric::PlayersJoining => "players_joining",
            ServerMetric::MaxPlayers => "server_max_players",
            ServerMetric::EntityCount => "server_entity_count",
            ServerMetric::Uptime => "server_uptime",
            ServerMetric::Framerate => "server_framerate",
            ServerMetric::Memory => "server_memory",
            ServerMetric::Collections => "server_collections",
            ServerMetric::NetworkIn => "server_network_in",
            ServerMetric::NetworkOut => "server_network_out",
            ServerMetric::Restarting => "server_restarting",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            ServerMetric::Players => "The number of currently connected players.",
            ServerMetric::PlayersQueued => "The number of players queued to connect.",
            ServerMetric::PlayersJoining => "The number of players connecting.",
            ServerMetric::MaxPlayers => "Max number of players allowed to join.",
            ServerMetric::EntityCount => "Number of entities loaded in game.",
            ServerMetric::Uptime => "How long the server has been up for.",
            ServerMetric::Framerate => "Server framerate.",
            ServerMetric::Memory => "Server memory consumption.",
            ServerMetric::Collections => "Number of collections loaded in game.",
            ServerMetric::NetworkIn => "Ingress networking traffic.",
            ServerMetric::NetworkOut => "Egress networking traffic.",
            ServerMetric::Restarting => "1 if the server is restarting, 0 for running.",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Metrics describing the scrape itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaMetric {
    Up,
    LastScrapeError,
    LastScrapeConnectTime,
    LastScrapeDuration,
    ScrapesTotal,
    ScrapeDuration,
    TargetScrapeRequestErrors,
}

impl MetaMetric {
    pub const ALL: [MetaMetric; 7] = [
        MetaMetric::Up,
        MetaMetric::LastScrapeError,
        MetaMetric::LastScrapeConnectTime,
        MetaMetric::LastScrapeDuration,
        MetaMetric::ScrapesTotal,
        MetaMetric::ScrapeDuration,
        MetaMetric::TargetScrapeRequestErrors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetaMetric::Up => "up",
            MetaMetric::LastScrapeError => "exporter_last_scrape_error",
            MetaMetric::LastScrapeConnectTime => "exporter_last_scrape_connect_time_seconds",
            MetaMetric::LastScrapeDuration => "exporter_last_scrape_duration_seconds",
            MetaMetric::ScrapesTotal => "exporter_scrapes_total",
            MetaMetric::ScrapeDuration => "exporter_scrape_duration_seconds",
            MetaMetric::TargetScrapeRequestErrors => "target_scrape_request_errors_total",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            MetaMetric::Up => "Whether the last scrape of the Rust server succeeded.",
            MetaMetric::LastScrapeError => {
                "1 if the last scrape failed, 0 otherwise; the err label holds the message."
            }
            MetaMetric::LastScrapeConnectTime => {
                "Time taken to open the control connection, in seconds."
            }
            MetaMetric::LastScrapeDuration => "Duration of the last scrape, in seconds.",
            MetaMetric::ScrapesTotal => "Current total Rust server scrapes.",
            MetaMetric::ScrapeDuration => "Durations of scrapes by the exporter",
            MetaMetric::TargetScrapeRequestErrors => "Errors in requests to the exporter",
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        match self {
            MetaMetric::LastScrapeError => &["err"],
            _ => &[],
        }
    }

    fn kind(&self) -> MetricKind {
        match self {
            MetaMetric::ScrapesTotal | MetaMetric::TargetScrapeRequestErrors => MetricKind::Counter,
            MetaMetric::ScrapeDuration => MetricKind::Summary,
            _ => MetricKind::Gauge,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug)]
struct Catalog {
    server: Vec<Arc<Desc>>,
    server_unlabeled: Vec<Arc<Desc>>,
    meta: Vec<Arc<Desc>>,
}

/// Descriptor registry for one namespace.
#[derive(Debug, Clone)]
pub struct MetricSchema {
    catalog: Arc<Catalog>,
}

impl MetricSchema {
    pub fn new(namespace: &str) -> Self {
        let server: Vec<Arc<Desc>> = ServerMetric::ALL
            .iter()
            .map(|m| {
                Arc::new(Desc::new(
                    namespace,
                    m.name(),
                    m.help(),
                    &BUILD_LABELS,
                    MetricKind::Gauge,
                ))
            })
            .collect();
        let server_unlabeled = server.iter().map(|d| Arc::new(d.unlabeled())).collect();
        let meta = MetaMetric::ALL
            .iter()
            .map(|m| Arc::new(Desc::new(namespace, m.name(), m.help(), m.labels(), m.kind())))
            .collect();

        Self {
            catalog: Arc::new(Catalog {
                server,
                server_unlabeled,
                meta,
            }),
        }
    }

    /// Labeled descriptor of a server gauge.
    pub fn server(&self, metric: ServerMetric) -> &Arc<Desc> {
        &self.catalog.server[metric.index()]
    }

    pub fn meta(&self, metric: MetaMetric) -> &Arc<Desc> {
        &self.catalog.meta[metric.index()]
    }

    /// Every descriptor this schema can emit, labeled server gauges first.
    pub fn describe(&self) -> Vec<Arc<Desc>> {
        self.catalog
            .server
            .iter()
            .chain(self.catalog.meta.iter())
            .cloned()
            .collect()
    }

    /// Project a fingerprint onto [`BUILD_LABELS`] order.
    ///
    /// `None` (the build info fetch failed) yields an empty vector.
    pub fn build_label_values(fingerprint: Option<&BuildFingerprint>) -> Vec<String> {
        let Some(b) = fingerprint else {
            return Vec::new();
        };
        vec![
            b.date_string(),
            b.build_id.clone(),
            b.build_number.clone(),
            b.build_tag.clone(),
            b.build_url.clone(),
            b.build_name.clone(),
            b.build_node.clone(),
            b.valid.to_string(),
            b.scm_type.clone(),
            b.scm_change_id.clone(),
            b.scm_branch.clone(),
            b.scm_repo.clone(),
            b.scm_comment.clone(),
            b.scm_author.clone(),
            b.scm_date.clone(),
        ]
    }

    /// Sample for a server gauge.
    ///
    /// An empty label vector selects the unlabeled form of the descriptor;
    /// any other arity mismatch drops the sample.
    pub fn server_sample(
        &self,
        metric: ServerMetric,
        value: f64,
        label_values: &[String],
    ) -> Option<Sample> {
        let desc = if label_values.is_empty() {
            &self.catalog.server_unlabeled[metric.index()]
        } else {
            self.server(metric)
        };
        Sample::scalar(Arc::clone(desc), value, label_values.to_vec())
    }

    pub fn meta_sample(&self, metric: MetaMetric, value: f64, label_values: &[&str]) -> Option<Sample> {
        Sample::scalar(
            Arc::clone(self.meta(metric)),
            value,
            label_values.iter().map(|l| l.to_string()).collect(),
        )
    }

    pub fn summary_sample(&self, metric: MetaMetric, count: u64, sum: f64) -> Option<Sample> {
        Sample::new(
            Arc::clone(self.meta(metric)),
            SampleValue::Summary { count, sum },
            Vec::new(),
        )
    }
}
