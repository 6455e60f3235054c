//! Metric descriptors.

use std::fmt;

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
    Summary,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
            MetricKind::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one metric: name, help, and ordered label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub fq_name: String,
    pub help: String,
    pub label_names: Vec<String>,
    pub kind: MetricKind,
}

impl Desc {
    pub fn new(
        namespace: &str,
        name: &str,
        help: &str,
        label_names: &[&str],
        kind: MetricKind,
    ) -> Self {
        Self {
            fq_name: fq_name(namespace, name),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            kind,
        }
    }

    /// Same metric without labels.
    pub fn unlabeled(&self) -> Self {
        Self {
            label_names: Vec::new(),
            ..self.clone()
        }
    }
}

/// Join a namespace and a metric name with `_`, skipping an empty namespace.
pub fn fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fq_name_with_and_without_namespace() {
        assert_eq!(fq_name("", "up"), "up");
        assert_eq!(fq_name("rust", "up"), "rust_up");
    }

    #[test]
    fn unlabeled_keeps_identity() {
        let desc = Desc::new("rust", "players", "Players.", &["a", "b"], MetricKind::Gauge);
        let bare = desc.unlabeled();
        assert_eq!(bare.fq_name, "rust_players");
        assert_eq!(bare.help, "Players.");
        assert!(bare.label_names.is_empty());
    }
}
