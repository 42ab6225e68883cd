//! LogMetrics - server log error metrics reporter
//!
//! A CLI tool that scans a server log for ERROR/EXCEPTION lines,
//! charts each error type's occurrences over time, and produces
//! a PDF (or JSON) summary report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (open/read failure, report write failure, etc.)

mod analysis;
mod chart;
mod cli;
mod config;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use models::ScanOutcome;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        match handle_init_config() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("\n❌ Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging(&args);

    info!("LogMetrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the scan and report workflow
    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report generation failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .logmetrics.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".logmetrics.toml");

    if path.exists() {
        eprintln!("⚠️  .logmetrics.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .logmetrics.toml")?;

    println!("✅ Created .logmetrics.toml with default settings.");
    println!("   Edit it to customize output, grouping, and chart settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete scan → charts → report workflow. Returns exit code.
fn run_report(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Parse the log file and extract error occurrences
    println!("🔍 Scanning log file: {}", args.log.display());

    let scan_config = scanner::ScanConfig::from(&config.scanner);
    let log_scanner = scanner::LogScanner::new(scan_config)?;
    let outcome = log_scanner.scan(&args.log)?;

    info!(
        "Scanned {} lines: {} error types, {} occurrences",
        outcome.lines_scanned,
        outcome.metrics.len(),
        analysis::total_occurrences(&outcome.metrics)
    );
    if outcome.lines_skipped > 0 {
        warn!(
            "{} error line(s) skipped (unparsable timestamp)",
            outcome.lines_skipped
        );
    }

    // Handle --dry-run: print the table and exit
    if args.dry_run {
        return handle_dry_run(&outcome);
    }

    // Step 2: Generate charts for each error type
    let charts_dir = PathBuf::from(&config.chart.output_dir);
    let mut charts_rendered = 0;

    if config.report.embed_charts && !outcome.metrics.is_empty() {
        println!("📈 Rendering {} chart(s)...", outcome.metrics.len());
        let render_config = chart::RenderConfig::from(&config.chart);
        charts_rendered = chart::render_all(&outcome.metrics, &render_config).len();
    }

    // Step 3: Generate the report
    println!("📝 Generating report...");

    let output = output_path(&args, &config);
    let options = report::ReportOptions {
        charts_dir,
        chart_pixels: (config.chart.width, config.chart.height),
        embed_charts: config.report.embed_charts,
        include_timestamps: config.report.include_timestamps,
        source: args.log.display().to_string(),
    };

    match args.format {
        OutputFormat::Pdf => report::generate_pdf_report(&outcome.metrics, &options, &output)?,
        OutputFormat::Json => report::write_json_report(&outcome.metrics, &options, &output)?,
    }

    // Print summary
    println!("\n📊 Scan Summary:");
    println!("   Lines scanned: {}", outcome.lines_scanned);
    println!("   Error types: {}", outcome.metrics.len());
    println!(
        "   Total occurrences: {}",
        analysis::total_occurrences(&outcome.metrics)
    );
    if outcome.lines_skipped > 0 {
        println!("   Lines skipped: {}", outcome.lines_skipped);
    }
    if config.report.embed_charts {
        println!("   Charts rendered: {}", charts_rendered);
    }
    println!(
        "\n✅ Error metrics report has been generated and saved to {}",
        output.display()
    );

    Ok(0)
}

/// Handle --dry-run: print the metrics table, produce no artifacts.
fn handle_dry_run(outcome: &ScanOutcome) -> Result<i32> {
    println!("\n🔍 Dry run: no charts or report will be written.\n");

    if outcome.metrics.is_empty() {
        println!("   No error lines found.");
    } else {
        for line in analysis::summary_text(&outcome.metrics).lines() {
            println!("   {}", line);
        }
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Effective report output path.
///
/// An explicit -o wins; otherwise the configured default gets the extension
/// matching the selected format.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let mut output = PathBuf::from(&config.general.output);
    if args.output.is_none() {
        output.set_extension(args.format_extension());
    }
    output
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .logmetrics.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
