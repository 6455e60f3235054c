//! Scrape coordinator: one serialized scrape cycle per collect call.
//!
//! The control protocol session is single-threaded, so a coordinator
//! holds its cycle lock from connect through emit. Concurrent callers
//! queue on the lock; the queue depth is tracked for logging.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::Mutex as CycleLock;
use tracing::{debug, error};

use fpx_core::{ExporterConfig, SnapshotSource, parse_build_info, parse_player_roster, parse_server_info};
use fpx_metrics::{Desc, MetaMetric, MetricBuffer, MetricSchema, MetricSink, Sample, ServerMetric};
use fpx_rcon::{Connector, ControlLink, WebRconConnector, endpoint_url};

use crate::error::ScrapeError;
use crate::mapping::{roster_values, snapshot_values};

/// Settings shared by every coordinator built from one configuration.
#[derive(Clone)]
pub struct ScrapeOptions {
    pub password: String,
    pub namespace: String,
    pub snapshot_source: SnapshotSource,
    pub connector: Arc<dyn Connector>,
}

impl ScrapeOptions {
    /// Options backed by the WebRCON connector.
    pub fn from_config(config: &ExporterConfig) -> Self {
        Self {
            password: config.rust_password.clone(),
            namespace: config.namespace.clone(),
            snapshot_source: config.snapshot_source,
            connector: Arc::new(WebRconConnector::new(
                config.connect_timeout,
                config.command_timeout,
            )),
        }
    }
}

impl fmt::Debug for ScrapeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeOptions")
            .field("password", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("snapshot_source", &self.snapshot_source)
            .finish_non_exhaustive()
    }
}

/// Where a coordinator is within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapePhase {
    Idle,
    Connecting,
    FetchingBuildInfo,
    FetchingSnapshot,
    Emitting,
    Failed,
}

/// Marks a caller as queued on the cycle lock until dropped, so a
/// cancelled waiter leaves the depth unchanged.
struct QueueSlot<'a>(&'a AtomicUsize);

impl<'a> QueueSlot<'a> {
    fn take(waiting: &'a AtomicUsize) -> Self {
        waiting.fetch_add(1, Ordering::Relaxed);
        Self(waiting)
    }
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Returns the coordinator to `Idle` when a cycle ends or is cancelled.
struct IdleOnDrop<'a>(&'a ScrapeCoordinator);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set_phase(ScrapePhase::Idle);
    }
}

/// Running totals, mutated only while the cycle lock is held.
#[derive(Debug, Default)]
struct ScrapeTotals {
    scrapes: u64,
    duration_count: u64,
    duration_sum: f64,
}

pub struct ScrapeCoordinator {
    target: String,
    options: ScrapeOptions,
    schema: MetricSchema,
    cycle: CycleLock<ScrapeTotals>,
    phase: Mutex<ScrapePhase>,
    waiting: AtomicUsize,
    request_errors: AtomicU64,
}

impl fmt::Debug for ScrapeCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeCoordinator")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl ScrapeCoordinator {
    /// Create a coordinator for `target`.
    ///
    /// An empty target yields a coordinator that only reports its own
    /// scrape counters.
    pub fn new(target: &str, options: ScrapeOptions) -> Result<Self, ScrapeError> {
        let target = target.trim().to_string();
        if !target.is_empty() {
            endpoint_url(&target, &options.password).map_err(ScrapeError::Config)?;
        }
        debug!(server = %target, ?options, "scrape coordinator created");

        Ok(Self {
            schema: MetricSchema::new(&options.namespace),
            target,
            options,
            cycle: CycleLock::new(ScrapeTotals::default()),
            phase: Mutex::new(ScrapePhase::Idle),
            waiting: AtomicUsize::new(0),
            request_errors: AtomicU64::new(0),
        })
    }

    pub fn options(&self) -> &ScrapeOptions {
        &self.options
    }

    /// Every descriptor a cycle of this coordinator can emit.
    pub fn describe(&self) -> Vec<Arc<Desc>> {
        self.schema.describe()
    }

    pub fn phase(&self) -> ScrapePhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Collect calls currently blocked behind an in-flight cycle.
    pub fn queue_depth(&self) -> usize {
        self.waiting.load(Ordering::Relaxed)
    }

    /// Count a rejected ad-hoc scrape request.
    pub fn record_request_error(&self) {
        self.request_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn set_phase(&self, phase: ScrapePhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
        debug!(server = %self.target, ?phase, "scrape phase");
    }

    /// Run one cycle and return its samples.
    pub async fn collect(&self) -> MetricBuffer {
        let mut buffer = MetricBuffer::new();
        self.collect_into(&mut buffer).await;
        buffer
    }

    /// Run one scrape cycle, emitting its samples into `sink`.
    ///
    /// Never fails: connection and command errors become `up 0` and the
    /// error gauge.
    pub async fn collect_into(&self, sink: &mut dyn MetricSink) {
        let queue = QueueSlot::take(&self.waiting);
        let mut totals = self.cycle.lock().await;
        drop(queue);
        let queued = self.queue_depth();
        let _idle = IdleOnDrop(self);

        totals.scrapes += 1;
        debug!(server = %self.target, scrape = totals.scrapes, queued, "scrape cycle started");

        if !self.target.is_empty() {
            let started = Instant::now();
            let up = match self.scrape(sink).await {
                Ok(()) => {
                    sink.emit_opt(self.schema.meta_sample(MetaMetric::LastScrapeError, 0.0, &[""]));
                    1.0
                }
                Err(e) => {
                    self.set_phase(ScrapePhase::Failed);
                    error!(server = %self.target, error = %e, "scrape failed");
                    let message = e.to_string();
                    sink.emit_opt(self.schema.meta_sample(
                        MetaMetric::LastScrapeError,
                        1.0,
                        &[message.as_str()],
                    ));
                    0.0
                }
            };
            self.set_phase(ScrapePhase::Emitting);
            sink.emit_opt(self.schema.meta_sample(MetaMetric::Up, up, &[]));

            let took = started.elapsed().as_secs_f64();
            totals.duration_count += 1;
            totals.duration_sum += took;
            sink.emit_opt(self.schema.meta_sample(MetaMetric::LastScrapeDuration, took, &[]));
        }

        sink.emit_opt(self.schema.meta_sample(
            MetaMetric::ScrapesTotal,
            totals.scrapes as f64,
            &[],
        ));
        sink.emit_opt(self.schema.summary_sample(
            MetaMetric::ScrapeDuration,
            totals.duration_count,
            totals.duration_sum,
        ));
        sink.emit_opt(self.schema.meta_sample(
            MetaMetric::TargetScrapeRequestErrors,
            self.request_errors.load(Ordering::Relaxed) as f64,
            &[],
        ));
    }

    /// Connect, fetch, and close. Connect time is emitted on every path.
    async fn scrape(&self, sink: &mut dyn MetricSink) -> Result<(), ScrapeError> {
        self.set_phase(ScrapePhase::Connecting);
        let started = Instant::now();
        let connected = self
            .options
            .connector
            .connect(&self.target, &self.options.password)
            .await;
        sink.emit_opt(self.schema.meta_sample(
            MetaMetric::LastScrapeConnectTime,
            started.elapsed().as_secs_f64(),
            &[],
        ));

        let mut link = connected.map_err(|e| {
            error!(server = %self.target, error = %e, "couldn't connect to rust server");
            ScrapeError::Connect(e)
        })?;

        let result = self.fetch(link.as_mut(), sink).await;
        link.close().await;
        result
    }

    async fn fetch(
        &self,
        link: &mut dyn ControlLink,
        sink: &mut dyn MetricSink,
    ) -> Result<(), ScrapeError> {
        self.set_phase(ScrapePhase::FetchingBuildInfo);
        let fingerprint = match link.execute("buildinfo").await {
            Ok(body) => {
                let decoded = parse_build_info(&body);
                if !decoded.is_complete() {
                    debug!(server = %self.target, fields = ?decoded.defaulted, "buildinfo fields defaulted");
                }
                Some(decoded.value)
            }
            Err(e) => {
                error!(server = %self.target, error = %e, "buildinfo failed, emitting without build labels");
                None
            }
        };
        let labels = MetricSchema::build_label_values(fingerprint.as_ref());

        self.set_phase(ScrapePhase::FetchingSnapshot);
        let command = self.options.snapshot_source.command();
        let body = link
            .execute(command)
            .await
            .map_err(|source| ScrapeError::Execute {
                command: command.to_string(),
                source,
            })?;

        self.set_phase(ScrapePhase::Emitting);
        match self.options.snapshot_source {
            SnapshotSource::ServerInfo => {
                let decoded = parse_server_info(&body);
                if !decoded.is_complete() {
                    debug!(server = %self.target, fields = ?decoded.defaulted, "serverinfo fields defaulted");
                }
                let s = &decoded.value;
                debug!(
                    server = %self.target,
                    hostname = %s.hostname,
                    map = %s.map,
                    game_time = %s.game_time,
                    save_created = %s.save_created_time,
                    "serverinfo decoded"
                );
                self.emit_server(sink, &snapshot_values(s), &labels);
            }
            SnapshotSource::Players => {
                let roster = parse_player_roster(&body);
                debug!(server = %self.target, players = roster.count(), "player roster decoded");
                self.emit_server(sink, &roster_values(&roster), &labels);
            }
        }
        Ok(())
    }

    fn emit_server(
        &self,
        sink: &mut dyn MetricSink,
        values: &[(ServerMetric, f64)],
        labels: &[String],
    ) {
        for &(metric, value) in values {
            let sample: Option<Sample> = self.schema.server_sample(metric, value, labels);
            sink.emit_opt(sample);
        }
    }
}
