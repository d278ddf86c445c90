//! Generation metrics: JSONL persistence and summary loading.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// File name of the per-repo metrics log.
pub const METRICS_FILE: &str = ".scribe_metrics.jsonl";

/// One record per synthesis attempt, appended after the message is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetric {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub confidence: f64,
    pub message_length: usize,
    pub file_count: usize,
    /// False means every backend failed and the rule-based fallback wrote
    /// the message.
    pub success: bool,
    pub backend_used: String,
    pub elapsed_seconds: f64,
}

/// Where metrics go. Synthesis treats append failures as non-fatal.
pub trait MetricsSink: Send + Sync {
    fn append(&self, metric: &GenerationMetric) -> Result<(), MetricsError>;
}

/// Appends one JSON line per metric to a file, creating it on first use.
pub struct JsonlMetricsSink {
    path: PathBuf,
}

impl JsonlMetricsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlMetricsSink { path: path.into() }
    }
}

impl MetricsSink for JsonlMetricsSink {
    fn append(&self, metric: &GenerationMetric) -> Result<(), MetricsError> {
        let line = serde_json::to_string(metric).map_err(MetricsError::SerializeFailed)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(MetricsError::AppendFailed)?;
        writeln!(file, "{line}").map_err(MetricsError::AppendFailed)?;
        Ok(())
    }
}

/// Discards every metric. Used by `--dry-run` and by tests that do not
/// care about recording.
pub struct NullMetricsSink;

impl MetricsSink for NullMetricsSink {
    fn append(&self, _metric: &GenerationMetric) -> Result<(), MetricsError> {
        Ok(())
    }
}

/// Aggregates shown by `--stats`.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub total: usize,
    pub success_rate: f64,
    pub avg_confidence: f64,
    /// Top categories by count, descending, at most five.
    pub common_categories: Vec<(String, usize)>,
    pub avg_elapsed_seconds: f64,
}

/// Load and aggregate the metrics file. Returns `Ok(None)` when the file
/// does not exist yet; unparseable lines are skipped.
pub fn load_summary(path: &Path) -> Result<Option<MetricsSummary>, MetricsError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(MetricsError::ReadFailed(err)),
    };

    let metrics: Vec<GenerationMetric> = content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    if metrics.is_empty() {
        return Ok(None);
    }

    let total = metrics.len();
    let successes = metrics.iter().filter(|m| m.success).count();

    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for m in &metrics {
        *counts.entry(m.category.as_str()).or_default() += 1;
    }
    let mut common_categories: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    common_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    common_categories.truncate(5);

    Ok(Some(MetricsSummary {
        total,
        success_rate: successes as f64 / total as f64,
        avg_confidence: metrics.iter().map(|m| m.confidence).sum::<f64>() / total as f64,
        common_categories,
        avg_elapsed_seconds: metrics.iter().map(|m| m.elapsed_seconds).sum::<f64>()
            / total as f64,
    }))
}
