//! Metric aggregation and statistics.
//!
//! The accumulation discipline itself lives on
//! [`MetricsTable::record`](crate::models::MetricsTable::record); this module
//! provides read-only statistics over a finished table.

mod aggregator;

pub use aggregator::{busiest_error_types, observed_time_span, summary_text, total_occurrences};
