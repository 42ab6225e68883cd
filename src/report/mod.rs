//! Report building for the error metrics document.

mod generator;

pub use generator::{
    generate_json_report, generate_pdf_report, write_json_report, ReportOptions,
};
