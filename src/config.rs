//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.logmetrics.toml` files.

use crate::scanner::LabelMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report output path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "error_metrics_report.pdf".to_string()
}

/// Log scanner settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Label grouping rule: `full-message` (keyword plus line tail, the
    /// historical behavior) or `keyword` (one label per keyword).
    #[serde(default)]
    pub group_by: LabelMode,
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Chart width in pixels.
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_chart_height")]
    pub height: u32,

    /// Directory the chart PNGs are written to.
    #[serde(default = "default_charts_dir")]
    pub output_dir: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            output_dir: default_charts_dir(),
        }
    }
}

fn default_chart_width() -> u32 {
    900
}

fn default_chart_height() -> u32 {
    600
}

fn default_charts_dir() -> String {
    ".".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Embed the per-type chart images in the PDF.
    #[serde(default = "default_true")]
    pub embed_charts: bool,

    /// Include the full timestamp listing per section.
    #[serde(default = "default_true")]
    pub include_timestamps: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            embed_charts: true,
            include_timestamps: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".logmetrics.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Output path - only override if explicitly provided via CLI
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Grouping rule - only override if explicitly provided via CLI
        if let Some(group_by) = args.group_by {
            self.scanner.group_by = group_by;
        }

        // Charts directory - only override if explicitly provided via CLI
        if let Some(ref charts_dir) = args.charts_dir {
            self.chart.output_dir = charts_dir.display().to_string();
        }

        // Flags always override
        if args.no_charts {
            self.report.embed_charts = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests_support::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "error_metrics_report.pdf");
        assert_eq!(config.scanner.group_by, LabelMode::FullMessage);
        assert_eq!(config.chart.width, 900);
        assert!(config.report.embed_charts);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.pdf"
verbose = true

[scanner]
group_by = "keyword"

[chart]
width = 1200
output_dir = "charts"

[report]
embed_charts = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.pdf");
        assert!(config.general.verbose);
        assert_eq!(config.scanner.group_by, LabelMode::Keyword);
        assert_eq!(config.chart.width, 1200);
        assert_eq!(config.chart.height, 600);
        assert_eq!(config.chart.output_dir, "charts");
        assert!(!config.report.embed_charts);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.output = Some(std::path::PathBuf::from("weekly.pdf"));
        args.group_by = Some(LabelMode::Keyword);
        args.no_charts = true;

        config.merge_with_args(&args);

        assert_eq!(config.general.output, "weekly.pdf");
        assert_eq!(config.scanner.group_by, LabelMode::Keyword);
        assert!(!config.report.embed_charts);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[chart]"));
        assert!(toml_str.contains("[report]"));
    }
}
