//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::scanner::LabelMode;
use clap::Parser;
use std::path::PathBuf;

/// LogMetrics - server log error metrics reporter
///
/// Scan a server log for ERROR/EXCEPTION lines, chart each error type's
/// occurrences over time, and produce a PDF (or JSON) summary report.
///
/// Examples:
///   logmetrics
///   logmetrics /var/log/app/server.log -o weekly_errors.pdf
///   logmetrics server.log --group-by keyword --charts-dir charts
///   logmetrics server.log --format json -o error_metrics.json
///   logmetrics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the server log file to scan
    #[arg(value_name = "LOG_FILE", default_value = "server.log")]
    pub log: PathBuf,

    /// Output file path for the report
    ///
    /// Defaults to error_metrics_report.pdf (or the config file setting).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory to write the per-type chart PNGs to
    ///
    /// The report looks for chart images in the same directory.
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Output format (pdf, json)
    #[arg(long, default_value = "pdf", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// How occurrences are grouped into error types
    ///
    /// full-message: keyword plus the rest of the line (historical behavior,
    /// fragments types by message text). keyword: one label per keyword.
    #[arg(long, value_name = "MODE")]
    pub group_by: Option<LabelMode>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .logmetrics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip chart rendering and embedding
    #[arg(long)]
    pub no_charts: bool,

    /// Dry run: scan the log and print the metrics table, no artifacts
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .logmetrics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// PDF document (default)
    #[default]
    Pdf,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate charts directory if provided
        if let Some(ref charts_dir) = self.charts_dir {
            if charts_dir.exists() && !charts_dir.is_dir() {
                return Err(format!(
                    "Charts path is not a directory: {}",
                    charts_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Default file extension for the selected output format.
    pub fn format_extension(&self) -> &'static str {
        match self.format {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }
}


#[cfg(test)]
mod tests {
    use super::tests_support::make_args;
    use super::*;

    #[test]
    fn test_validation_default_args() {
        let args = make_args();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_path_ignores_environment() {
        std::env::set_var("LOGMETRICS_LOG", "/somewhere/else.log");
        let args = Args::try_parse_from(["logmetrics"]).unwrap();
        std::env::remove_var("LOGMETRICS_LOG");

        assert_eq!(args.log, PathBuf::from("server.log"));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_format_extension() {
        let mut args = make_args();
        assert_eq!(args.format_extension(), "pdf");

        args.format = OutputFormat::Json;
        assert_eq!(args.format_extension(), "json");
    }
}
