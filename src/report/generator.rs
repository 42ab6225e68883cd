//! PDF and JSON report generation.
//!
//! This module lays out the multi-section error metrics document: one
//! section per error type with its count, timestamp listing, and the chart
//! artifact the renderer wrote for that label.

use crate::chart::chart_path;
use crate::models::MetricsTable;
use anyhow::{Context, Result};
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const IMAGE_WIDTH_MM: f32 = 180.0;

/// Options controlling report layout and chart embedding.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Directory the chart renderer wrote its PNGs to.
    pub charts_dir: PathBuf,
    /// Pixel dimensions the charts were rendered at.
    pub chart_pixels: (u32, u32),
    /// Embed chart images in the PDF sections.
    pub embed_charts: bool,
    /// Include the full per-section timestamp listing.
    pub include_timestamps: bool,
    /// The scanned log path, shown in the report header.
    pub source: String,
}

/// Generate the PDF report and write it to `output`.
///
/// Sections appear in first-seen label order. A missing chart artifact does
/// not fail the report; the section gets a placeholder line instead.
pub fn generate_pdf_report(
    metrics: &MetricsTable,
    options: &ReportOptions,
    output: &Path,
) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new(
        "Error Metrics Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("Failed to load bold report font")?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("Failed to load report font")?;

    let layer_ref = doc.get_page(page).get_layer(layer);
    let mut cursor = PageCursor {
        doc,
        layer_ref,
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    cursor.text("Error Metrics Report", 16.0, &bold, 10.0);
    cursor.text(&format!("Source: {}", options.source), 10.0, &regular, 8.0);
    cursor.gap(6.0);

    for (label, metric) in metrics.iter() {
        cursor.text(&format!("Error Type: {}", label), 14.0, &bold, 8.0);
        cursor.text(
            &format!("Total Occurrences: {}", metric.count),
            12.0,
            &regular,
            7.0,
        );

        if options.include_timestamps {
            cursor.text("Occurrences:", 12.0, &regular, 7.0);
            for formatted in metric.formatted_timestamps() {
                cursor.text(&format!("  - {}", formatted), 11.0, &regular, 6.0);
            }
        }

        if options.embed_charts {
            embed_chart(&mut cursor, label, options, &regular);
        }

        cursor.gap(8.0);
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create report file: {}", output.display()))?;
    cursor
        .doc
        .save(&mut BufWriter::new(file))
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    debug!("wrote PDF report: {}", output.display());
    Ok(())
}

/// Embed a label's chart PNG, or a placeholder line when the artifact is
/// missing or unreadable. Chart rendering and report building stay
/// independently failable.
fn embed_chart(
    cursor: &mut PageCursor,
    label: &str,
    options: &ReportOptions,
    regular: &IndirectFontRef,
) {
    let path = chart_path(label, &options.charts_dir);

    if !path.exists() {
        cursor.text("  (chart unavailable)", 11.0, regular, 6.0);
        return;
    }

    let image = match load_png(&path) {
        Ok(image) => image,
        Err(e) => {
            warn!("could not embed chart {}: {:#}", path.display(), e);
            cursor.text("  (chart unavailable)", 11.0, regular, 6.0);
            return;
        }
    };

    let (px_w, px_h) = options.chart_pixels;
    let image_height_mm = IMAGE_WIDTH_MM * px_h as f32 / px_w as f32;
    let dpi = px_w as f32 / (IMAGE_WIDTH_MM / 25.4);

    cursor.ensure(image_height_mm + 4.0);
    cursor.y -= image_height_mm + 2.0;
    image.add_to_layer(
        cursor.layer().clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM)),
            translate_y: Some(Mm(cursor.y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    cursor.y -= 2.0;
}

fn load_png(path: &Path) -> Result<Image> {
    let file = File::open(path)?;
    let decoder = PngDecoder::new(BufReader::new(file))?;
    let image = Image::try_from(decoder)?;
    Ok(image)
}

/// Top-down layout cursor over the document, adding pages as sections run
/// past the bottom margin.
struct PageCursor {
    doc: PdfDocumentReference,
    layer_ref: PdfLayerReference,
    y: f32,
}

impl PageCursor {
    fn layer(&self) -> &PdfLayerReference {
        &self.layer_ref
    }

    /// Start a new page if fewer than `needed` millimeters remain.
    fn ensure(&mut self, needed: f32) {
        if self.y - needed < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer_ref = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    /// Write one text line and advance the cursor.
    fn text(&mut self, text: &str, size: f32, font: &IndirectFontRef, line_height: f32) {
        self.ensure(line_height);
        self.y -= line_height;
        self.layer()
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
    }

    /// Vertical whitespace between blocks.
    fn gap(&mut self, height: f32) {
        self.y = (self.y - height).max(MARGIN_MM);
    }
}

/// JSON rendition of the report content.
#[derive(Debug, Serialize)]
struct JsonReport {
    generated_at: String,
    source: String,
    total_error_types: usize,
    total_occurrences: usize,
    sections: Vec<JsonSection>,
}

#[derive(Debug, Serialize)]
struct JsonSection {
    label: String,
    count: usize,
    timestamps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<String>,
}

/// Generate the report as pretty JSON.
pub fn generate_json_report(metrics: &MetricsTable, options: &ReportOptions) -> Result<String> {
    let sections: Vec<JsonSection> = metrics
        .iter()
        .map(|(label, metric)| {
            let chart = options
                .embed_charts
                .then(|| chart_path(label, &options.charts_dir))
                .filter(|path| path.exists())
                .map(|path| path.display().to_string());

            JsonSection {
                label: label.to_string(),
                count: metric.count,
                timestamps: metric.formatted_timestamps(),
                chart,
            }
        })
        .collect();

    let report = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: options.source.clone(),
        total_error_types: metrics.len(),
        total_occurrences: crate::analysis::total_occurrences(metrics),
        sections,
    };

    serde_json::to_string_pretty(&report).map_err(Into::into)
}

/// Write the JSON report to a file.
pub fn write_json_report(
    metrics: &MetricsTable,
    options: &ReportOptions,
    output: &Path,
) -> Result<()> {
    let content = generate_json_report(metrics, options)?;
    std::fs::write(output, content)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    debug!("wrote JSON report: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn make_table() -> MetricsTable {
        let mut table = MetricsTable::new();
        table.record("ERROR DISK FULL", ts(10, 0));
        table.record("ERROR DISK FULL", ts(10, 5));
        table.record("EXCEPTION NULLPOINTER", ts(11, 0));
        table
    }

    fn make_options(charts_dir: &Path) -> ReportOptions {
        ReportOptions {
            charts_dir: charts_dir.to_path_buf(),
            chart_pixels: (900, 600),
            embed_charts: true,
            include_timestamps: true,
            source: "server.log".to_string(),
        }
    }

    #[test]
    fn test_pdf_report_with_missing_charts_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.pdf");

        // no chart PNGs exist; every section takes the placeholder path
        generate_pdf_report(&make_table(), &make_options(dir.path()), &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_report_empty_table_has_title_only() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.pdf");

        generate_pdf_report(&MetricsTable::new(), &make_options(dir.path()), &output).unwrap();

        assert!(output.exists());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn test_pdf_report_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("report.pdf");

        let result = generate_pdf_report(&make_table(), &make_options(dir.path()), &output);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_report_contains_all_sections() {
        let dir = tempfile::tempdir().unwrap();

        let json = generate_json_report(&make_table(), &make_options(dir.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_error_types"], 2);
        assert_eq!(value["total_occurrences"], 3);
        assert_eq!(value["sections"][0]["label"], "ERROR DISK FULL");
        assert_eq!(value["sections"][0]["count"], 2);
        assert_eq!(value["sections"][0]["timestamps"][0], "2024-01-01 10:00:00");
        assert_eq!(value["sections"][1]["label"], "EXCEPTION NULLPOINTER");
        // no chart artifact on disk, so no chart reference
        assert!(value["sections"][0].get("chart").is_none());
    }

    #[test]
    fn test_json_report_references_existing_chart() {
        let dir = tempfile::tempdir().unwrap();
        let chart = chart_path("ERROR DISK FULL", dir.path());
        std::fs::write(&chart, b"png").unwrap();

        let json = generate_json_report(&make_table(), &make_options(dir.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["sections"][0]["chart"],
            chart.display().to_string()
        );
    }
}
