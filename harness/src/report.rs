//! Run reports
//!
//! Renders a [`RunOutcome`] or a [`ReproducibilityReport`] as plain text,
//! JSON or CSV, and writes reports to disk.

use crate::reproducibility::ReproducibilityReport;
use crate::runner::RunOutcome;
use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human readable summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// `phase,elapsed_ms` rows followed by `metric,value` rows
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!(
                "Unknown report format '{}' (expected text, json or csv)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

pub fn render_outcome(outcome: &RunOutcome, format: ReportFormat) -> ReportResult<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        ReportFormat::Csv => Ok(outcome_csv(outcome)),
        ReportFormat::Text => Ok(outcome_text(outcome)),
    }
}

pub fn render_reproducibility(
    report: &ReproducibilityReport,
    format: ReportFormat,
) -> ReportResult<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Csv => {
            let mut output = String::from("metric,first,second\n");
            for difference in &report.differences {
                let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
                output.push_str(&format!(
                    "{},{},{}\n",
                    csv_field(&difference.name),
                    cell(difference.first),
                    cell(difference.second)
                ));
            }
            Ok(output)
        }
        ReportFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Experiment: {}\n", report.first.experiment));
            output.push_str(&format!("Seed: {}\n", report.first.seed));
            if report.reproducible {
                output.push_str(&format!(
                    "✓ Reproducible: {} metric(s) matched across two runs\n",
                    report.first.metrics.len()
                ));
            } else {
                output.push_str(&format!(
                    "✗ Not reproducible: {} metric(s) differ\n",
                    report.differences.len()
                ));
                for difference in &report.differences {
                    output.push_str(&format!("  - {}\n", difference));
                }
            }
            Ok(output)
        }
    }
}

pub fn write_report(path: impl AsRef<Path>, contents: &str) -> ReportResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

fn outcome_text(outcome: &RunOutcome) -> String {
    let mut output = String::new();
    output.push_str(&format!("Experiment: {}\n", outcome.experiment));
    output.push_str(&format!("Run: {}\n", outcome.run_id));
    output.push_str(&format!("Started: {}\n", outcome.started_at.to_rfc3339()));
    output.push_str(&format!("Seed: {}\n", outcome.seed));
    output.push_str(&format!(
        "Research question: {}\n",
        outcome.metadata.research_question
    ));
    output.push_str(&format!("Hypothesis: {}\n", outcome.metadata.hypothesis));
    output.push_str(&format!("Method: {}\n", outcome.metadata.method));
    output.push_str(&format!("State: {}\n", outcome.final_state));

    output.push_str("\nPhases:\n");
    for timing in &outcome.timings {
        output.push_str(&format!(
            "  {:<8} {:>10.3} ms\n",
            timing.phase.to_string(),
            timing.elapsed_ms
        ));
    }

    output.push_str("\nMetrics:\n");
    if outcome.metrics.is_empty() {
        output.push_str("  (none)\n");
    }
    for (name, value) in &outcome.metrics {
        output.push_str(&format!("  {} = {}\n", name, value));
    }

    output.push_str(&format!("\nVerdict: {}\n", outcome.analysis.verdict));
    for note in &outcome.analysis.notes {
        output.push_str(&format!("  - {}\n", note));
    }
    output
}

fn outcome_csv(outcome: &RunOutcome) -> String {
    let mut output = String::from("phase,elapsed_ms\n");
    for timing in &outcome.timings {
        output.push_str(&format!("{},{}\n", timing.phase, timing.elapsed_ms));
    }
    output.push_str("metric,value\n");
    for (name, value) in &outcome.metrics {
        output.push_str(&format!("{},{}\n", csv_field(name), value));
    }
    output
}

/// Quotes a CSV field per RFC 4180 when it holds a delimiter, quote or line break
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
