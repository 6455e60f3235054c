//! Prometheus text exposition format.
//!
//! Renders a scrape's samples for a Prometheus server or compatible agent.
//! Samples sharing a name are grouped under a single HELP/TYPE header, in
//! order of first appearance.

use std::fmt::Write;

use crate::sink::{Sample, SampleValue};

/// Content type of [`render_text`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples into Prometheus text format.
pub fn render_text(samples: &[Sample]) -> String {
    let mut out = String::new();
    let mut families: Vec<&str> = Vec::new();

    for s in samples {
        if !families.contains(&s.name()) {
            families.push(s.name());
        }
    }

    for family in families {
        let mut members = samples.iter().filter(|s| s.name() == family).peekable();
        let Some(first) = members.peek() else {
            continue;
        };

        let _ = writeln!(out, "# HELP {family} {}", escape_help(&first.desc.help));
        let _ = writeln!(out, "# TYPE {family} {}", first.desc.kind);

        for s in members {
            let labels = render_labels(&s.desc.label_names, &s.label_values);
            match s.value {
                SampleValue::Scalar(v) => {
                    let _ = writeln!(out, "{family}{labels} {}", format_value(v));
                }
                SampleValue::Summary { count, sum } => {
                    let _ = writeln!(out, "{family}_sum{labels} {}", format_value(sum));
                    let _ = writeln!(out, "{family}_count{labels} {count}");
                }
            }
        }
    }

    out
}

fn render_labels(names: &[String], values: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = names
        .iter()
        .zip(values)
        .map(|(n, v)| format!("{n}=\"{}\"", escape_label_value(v)))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        v.to_string()
    }
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
