//! fpx-metrics: metric catalog and exposition for the Rust exporter.
//!
//! # Architecture
//!
//! ```text
//! MetricSchema
//!   ├── server gauges (players, server_*)   ← labeled by BuildFingerprint
//!   ├── meta metrics (up, exporter_*)      ← unlabeled
//!   ├── build_label_values()               → 15 ordered label values
//!   └── describe()                         → every descriptor ever emitted
//!
//! Sample → MetricSink (trait)
//!   └── MetricBuffer → render_text() → text/plain for /metrics
//! ```

pub mod desc;
pub mod schema;
pub mod sink;
pub mod text;

pub use desc::{Desc, MetricKind, fq_name};
pub use schema::{BUILD_LABELS, MetaMetric, MetricSchema, ServerMetric};
pub use sink::{MetricBuffer, MetricSink, Sample, SampleValue};
pub use text::{CONTENT_TYPE, render_text};
