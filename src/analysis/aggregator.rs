//! Statistics helpers over an accumulated metrics table.

use crate::models::{MetricsTable, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;

/// Total number of occurrences across all error types.
pub fn total_occurrences(metrics: &MetricsTable) -> usize {
    metrics.iter().map(|(_, metric)| metric.count).sum()
}

/// The `n` error types with the most occurrences, highest first.
///
/// Ties keep first-seen order, so the result is deterministic.
#[allow(dead_code)] // Utility for top-N views
pub fn busiest_error_types(metrics: &MetricsTable, n: usize) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = metrics
        .iter()
        .map(|(label, metric)| (label, metric.count))
        .collect();

    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counts.truncate(n);
    counts
}

/// Earliest and latest timestamp observed across all error types.
///
/// Returns `None` for an empty table. Encounter order is not assumed to be
/// chronological, so both ends are searched.
pub fn observed_time_span(metrics: &MetricsTable) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut all = metrics
        .iter()
        .flat_map(|(_, metric)| metric.timestamps.iter().copied());

    let first = all.next()?;
    let (min, max) = all.fold((first, first), |(min, max), ts| {
        (min.min(ts), max.max(ts))
    });

    Some((min, max))
}

/// One-line-per-type text summary, in first-seen order.
pub fn summary_text(metrics: &MetricsTable) -> String {
    let mut lines = vec![format!(
        "{} error types, {} total occurrences",
        metrics.len(),
        total_occurrences(metrics)
    )];

    if let Some((from, to)) = observed_time_span(metrics) {
        lines.push(format!(
            "observed from {} to {}",
            from.format(TIMESTAMP_FORMAT),
            to.format(TIMESTAMP_FORMAT)
        ));
    }

    for (label, metric) in metrics.iter() {
        lines.push(format!("- {}: {}", label, metric.count));
    }

    lines.join("\n")
}
