//! Log scanner for extracting error occurrences from a server log.
//!
//! This module performs the single sequential pass over the log file:
//! classify each line, parse its leading timestamp, and accumulate the
//! result into a [`MetricsTable`].

use crate::models::{MetricsTable, ScanOutcome, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Fatal scan failures. A single bad line is not an error; it is skipped
/// with a diagnostic and never reaches this taxonomy.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("error opening file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// Mid-stream read failure. Metrics collected so far are discarded.
    #[error("error reading file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// How occurrences are grouped into error-type labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LabelMode {
    /// Label is the matched keyword plus all trailing text, uppercased.
    ///
    /// Lines with the same keyword but different messages produce different
    /// labels, so nearly every distinct message becomes its own type.
    #[default]
    FullMessage,
    /// Label is just the uppercased keyword (`ERROR` or `EXCEPTION`).
    Keyword,
}

/// Configuration for log scanning.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Label grouping rule.
    pub label_mode: LabelMode,
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            label_mode: config.group_by,
        }
    }
}

/// Single-pass log scanner.
pub struct LogScanner {
    config: ScanConfig,
    /// Matches the error token, a space, and the rest of the line;
    /// group 1 is the keyword. A bare keyword at end of line does not match.
    error_pattern: Regex,
    /// Matches the exact leading `YYYY-MM-DD HH:MM:SS` timestamp.
    timestamp_pattern: Regex,
}

impl LogScanner {
    /// Create a scanner with compiled patterns.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        Ok(Self {
            config,
            error_pattern: Regex::new(r"(?i)\b(ERROR|EXCEPTION) .*")?,
            timestamp_pattern: Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}")?,
        })
    }

    /// Scan the log file at `path` and build the metrics table.
    ///
    /// File-open and mid-stream read failures abort the whole scan; lines
    /// whose timestamp does not parse are skipped with a warning.
    pub fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        let file = File::open(path).map_err(|source| ScanError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let reader = BufReader::new(file);
        let mut metrics = MetricsTable::new();
        let mut lines_scanned = 0usize;
        let mut lines_skipped = 0usize;

        for line in reader.lines() {
            let line = line.map_err(|source| ScanError::Read {
                path: path.display().to_string(),
                source,
            })?;
            lines_scanned += 1;

            let Some(label) = self.classify(&line) else {
                continue;
            };

            match self.parse_timestamp(&line) {
                Some(timestamp) => {
                    metrics.record(&label, timestamp);
                }
                None => {
                    warn!("skipping line with unparsable timestamp: {}", line);
                    lines_skipped += 1;
                }
            }
        }

        debug!(
            "scanned {} lines, {} distinct error types, {} skipped",
            lines_scanned,
            metrics.len(),
            lines_skipped
        );

        Ok(ScanOutcome {
            metrics,
            lines_scanned,
            lines_skipped,
        })
    }

    /// Classify a line; returns the uppercased error-type label if the line
    /// contains the `ERROR`/`EXCEPTION` token.
    fn classify(&self, line: &str) -> Option<String> {
        let captures = self.error_pattern.captures(line)?;

        let matched = match self.config.label_mode {
            LabelMode::FullMessage => captures.get(0)?.as_str(),
            LabelMode::Keyword => captures.get(1)?.as_str(),
        };

        Some(matched.to_uppercase())
    }

    /// Parse the leading timestamp, if the line starts with one.
    fn parse_timestamp(&self, line: &str) -> Option<NaiveDateTime> {
        let raw = self.timestamp_pattern.find(line)?.as_str();
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn scanner(mode: LabelMode) -> LogScanner {
        LogScanner::new(ScanConfig { label_mode: mode }).unwrap()
    }

    fn write_log(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_repeated_error_accumulates() {
        let log = write_log(&[
            "2024-01-01 10:00:00 ERROR disk full",
            "2024-01-01 10:05:00 ERROR disk full",
        ]);

        let outcome = scanner(LabelMode::FullMessage).scan(log.path()).unwrap();
        assert_eq!(outcome.metrics.len(), 1);

        let metric = outcome.metrics.get("ERROR DISK FULL").unwrap();
        assert_eq!(metric.count, 2);
        assert_eq!(metric.formatted_timestamps()[0], "2024-01-01 10:00:00");
        assert_eq!(metric.formatted_timestamps()[1], "2024-01-01 10:05:00");
    }

    #[test]
    fn test_line_without_timestamp_is_skipped() {
        let log = write_log(&["ERROR disk full"]);

        let outcome = scanner(LabelMode::FullMessage).scan(log.path()).unwrap();
        assert!(outcome.metrics.is_empty());
        assert_eq!(outcome.lines_skipped, 1);
    }

    #[test]
    fn test_case_insensitive_labels_merge() {
        let log = write_log(&[
            "2024-01-01 10:00:00 EXCEPTION NullPointer",
            "2024-01-01 10:01:00 exception nullpointer",
        ]);

        let outcome = scanner(LabelMode::FullMessage).scan(log.path()).unwrap();
        assert_eq!(outcome.metrics.len(), 1);
        assert_eq!(outcome.metrics.get("EXCEPTION NULLPOINTER").unwrap().count, 2);
    }

    #[test]
    fn test_non_error_lines_ignored() {
        let log = write_log(&[
            "2024-01-01 10:00:00 INFO server started",
            "2024-01-01 10:01:00 DEBUG heartbeat",
            "2024-01-01 10:02:00 ERROR timeout",
        ]);

        let outcome = scanner(LabelMode::FullMessage).scan(log.path()).unwrap();
        assert_eq!(outcome.metrics.len(), 1);
        assert_eq!(outcome.lines_scanned, 3);
        assert!(outcome.metrics.get("ERROR TIMEOUT").is_some());
    }

    #[test]
    fn test_bare_keyword_at_end_of_line_not_classified() {
        let log = write_log(&[
            "2024-01-01 10:00:00 ERROR",
            "2024-01-01 10:01:00 an unrelated ERRORS word",
        ]);

        let outcome = scanner(LabelMode::FullMessage).scan(log.path()).unwrap();
        assert!(outcome.metrics.is_empty());
        // not error lines at all, so nothing was skipped either
        assert_eq!(outcome.lines_skipped, 0);
    }

    #[test]
    fn test_empty_file_yields_empty_table() {
        let log = write_log(&[]);

        let outcome = scanner(LabelMode::FullMessage).scan(log.path()).unwrap();
        assert!(outcome.metrics.is_empty());
        assert_eq!(outcome.lines_scanned, 0);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = scanner(LabelMode::FullMessage)
            .scan(Path::new("/nonexistent/server.log"));
        assert!(matches!(result, Err(ScanError::Open { .. })));
    }

    #[test]
    fn test_keyword_mode_folds_messages() {
        let log = write_log(&[
            "2024-01-01 10:00:00 ERROR disk full",
            "2024-01-01 10:01:00 ERROR connection refused",
            "2024-01-01 10:02:00 EXCEPTION NullPointer",
        ]);

        let outcome = scanner(LabelMode::Keyword).scan(log.path()).unwrap();
        assert_eq!(outcome.metrics.len(), 2);
        assert_eq!(outcome.metrics.get("ERROR").unwrap().count, 2);
        assert_eq!(outcome.metrics.get("EXCEPTION").unwrap().count, 1);
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let log = write_log(&[
            "2024-01-01 10:00:00 ERROR disk full",
            "2024-01-01 10:05:00 EXCEPTION NullPointer",
        ]);

        let scanner = scanner(LabelMode::FullMessage);
        let first = scanner.scan(log.path()).unwrap();
        let second = scanner.scan(log.path()).unwrap();
        assert_eq!(first.metrics, second.metrics);
    }
}
