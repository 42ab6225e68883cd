//! Data models for the log metrics reporter.
//!
//! This module contains the core data structures shared by the scanner,
//! the chart renderer, and the report builder.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Timestamp format used by qualifying log lines (and echoed in the report).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// All observed occurrences of one error-type label.
///
/// Invariant: `count == timestamps.len()` after every update. Timestamps are
/// kept in encounter order; they are chronological only if the log itself is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetric {
    /// Number of qualifying lines seen for this label.
    pub count: usize,
    /// Parsed timestamps, one per qualifying line, in encounter order.
    pub timestamps: Vec<NaiveDateTime>,
}

impl ErrorMetric {
    /// Timestamps formatted for display, in encounter order.
    pub fn formatted_timestamps(&self) -> Vec<String> {
        self.timestamps
            .iter()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .collect()
    }
}

/// Mapping from error-type label to its metric.
///
/// Labels are stored uppercased by the scanner. A secondary first-seen label
/// list makes iteration order deterministic, so chart generation, report
/// sections, and the JSON output are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    entries: HashMap<String, ErrorMetric>,
    order: Vec<String>,
}

impl MetricsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence: find-or-create the metric for `label`,
    /// increment its count, and append `timestamp`.
    pub fn record(&mut self, label: &str, timestamp: NaiveDateTime) {
        if !self.entries.contains_key(label) {
            self.order.push(label.to_string());
        }
        let metric = self.entries.entry(label.to_string()).or_default();
        metric.count += 1;
        metric.timestamps.push(timestamp);
    }

    /// Look up the metric for a label.
    #[allow(dead_code)] // Utility for lookups outside full iteration
    pub fn get(&self, label: &str) -> Option<&ErrorMetric> {
        self.entries.get(label)
    }

    /// Labels in first-seen order.
    #[allow(dead_code)] // Utility for callers that only need labels
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Iterate `(label, metric)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErrorMetric)> {
        self.order
            .iter()
            .filter_map(|label| self.entries.get(label).map(|m| (label.as_str(), m)))
    }

    /// Number of distinct error-type labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no qualifying line was seen.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one scan pass over a log file.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Accumulated metrics, one entry per error-type label.
    pub metrics: MetricsTable,
    /// Total lines read from the file.
    pub lines_scanned: usize,
    /// Error lines dropped because their leading timestamp did not parse.
    pub lines_skipped: usize,
}
