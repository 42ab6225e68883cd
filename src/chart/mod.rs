//! Chart rendering for per-type occurrence charts.
//!
//! Each error type gets a PNG scatter plot: X is the occurrence timestamp
//! as seconds since the Unix epoch, Y is the 1-based cumulative occurrence
//! index, so the points trace a cumulative-count-over-time curve.

use crate::models::{ErrorMetric, MetricsTable};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration for chart rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
    /// Directory the PNG artifacts are written to.
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            output_dir: PathBuf::from("."),
        }
    }
}

impl From<&crate::config::ChartConfig> for RenderConfig {
    fn from(config: &crate::config::ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            output_dir: PathBuf::from(&config.output_dir),
        }
    }
}

/// Deterministic, filesystem-safe chart filename for a label.
///
/// The report builder derives the same name to locate the artifact, so the
/// two sides need no shared bookkeeping.
pub fn chart_filename(label: &str) -> String {
    let slug: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    format!("{}_graph.png", slug)
}

/// Map timestamps to scatter points: X seconds since epoch, Y = index + 1.
fn cumulative_points(timestamps: &[NaiveDateTime]) -> Vec<(f64, f64)> {
    timestamps
        .iter()
        .enumerate()
        .map(|(i, ts)| (ts.and_utc().timestamp() as f64, (i + 1) as f64))
        .collect()
}

/// Render the chart for one error type, returning the artifact path.
pub fn render_chart(label: &str, metric: &ErrorMetric, config: &RenderConfig) -> Result<PathBuf> {
    let path = config.output_dir.join(chart_filename(label));
    let points = cumulative_points(&metric.timestamps);

    let root = BitMapBackend::new(&path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .with_context(|| format!("failed to prepare chart canvas for {}", label))?;

    let (mut x_min, mut x_max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &(x, _)| {
            (min.min(x), max.max(x))
        });
    if points.is_empty() || x_min >= x_max {
        // single instant (or no points); pad so the axis has a valid range
        let center = points.first().map_or(0.0, |&(x, _)| x);
        x_min = center - 60.0;
        x_max = center + 60.0;
    }
    let y_max = (metric.count as f64) + 1.0;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Occurrences of {}", label), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .with_context(|| format!("failed to build chart for {}", label))?;

    chart
        .configure_mesh()
        .x_desc("Time (seconds since epoch)")
        .y_desc("Occurrences")
        .draw()
        .with_context(|| format!("failed to draw chart grid for {}", label))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
        )
        .with_context(|| format!("failed to plot points for {}", label))?;

    root.present()
        .with_context(|| format!("failed to save chart for {}", label))?;
    drop(chart);
    drop(root);

    debug!("rendered chart: {}", path.display());
    Ok(path)
}

/// Render charts for every error type in first-seen order.
///
/// A failure for one type is logged and that type is skipped; the remaining
/// types still get their charts. Returns the paths that were written.
pub fn render_all(metrics: &MetricsTable, config: &RenderConfig) -> Vec<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        warn!(
            "cannot create charts directory {}: {}",
            config.output_dir.display(),
            e
        );
        return Vec::new();
    }

    let mut rendered = Vec::new();

    for (label, metric) in metrics.iter() {
        match render_chart(label, metric, config) {
            Ok(path) => rendered.push(path),
            Err(e) => {
                warn!("skipping chart for {}: {:#}", label, e);
            }
        }
    }

    rendered
}

/// Path the report builder should expect the chart artifact at.
pub fn chart_path(label: &str, charts_dir: &Path) -> PathBuf {
    charts_dir.join(chart_filename(label))
}
