//! Samples and the sinks that receive them.

use std::sync::Arc;

use tracing::debug;

use crate::desc::Desc;

/// Value carried by one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    /// Gauge or counter reading.
    Scalar(f64),
    /// Summary without quantiles.
    Summary { count: u64, sum: f64 },
}

/// One emitted data point: descriptor, value, label values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub desc: Arc<Desc>,
    pub value: SampleValue,
    pub label_values: Vec<String>,
}

impl Sample {
    /// Build a sample, or `None` if the label arity does not match the
    /// descriptor.
    pub fn new(desc: Arc<Desc>, value: SampleValue, label_values: Vec<String>) -> Option<Self> {
        if desc.label_names.len() != label_values.len() {
            debug!(
                metric = %desc.fq_name,
                expected = desc.label_names.len(),
                got = label_values.len(),
                "dropping sample with mismatched labels"
            );
            return None;
        }
        Some(Self {
            desc,
            value,
            label_values,
        })
    }

    pub fn scalar(desc: Arc<Desc>, value: f64, label_values: Vec<String>) -> Option<Self> {
        Self::new(desc, SampleValue::Scalar(value), label_values)
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    /// Scalar reading, if this is not a summary.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            SampleValue::Scalar(v) => Some(v),
            SampleValue::Summary { .. } => None,
        }
    }
}

/// Receives the samples of a scrape.
pub trait MetricSink: Send {
    fn emit(&mut self, sample: Sample);

    /// Emit if the sample was well-formed.
    fn emit_opt(&mut self, sample: Option<Sample>) {
        if let Some(sample) = sample {
            self.emit(sample);
        }
    }
}

/// In-memory sink, in emission order.
#[derive(Debug, Default, Clone)]
pub struct MetricBuffer {
    samples: Vec<Sample>,
}

impl MetricBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First sample with the given fully-qualified name.
    pub fn find(&self, fq_name: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.name() == fq_name)
    }
}

impl MetricSink for MetricBuffer {
    fn emit(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
}
