#![warn(missing_docs)]
//! Regbench Report - Data Exchanged Between Phases
//!
//! - Collection JSON: raw runtime output of one collection run
//! - Footprint JSON: raw time reports of repeated runtime startups
//! - Metric lines: per-test summaries and baseline/current comparison records
//! - Suite reports: aggregated classifications, rendered as JSON here and as
//!   fixed-width text by the CLI

mod aggregate;
mod json;
mod metrics;
mod report;

pub use aggregate::{Accumulator, GroupTotals, ReportLine, ReportTotals, SuiteReport};
pub use json::{
    generate_collection_json, generate_footprint_json, generate_json_report, parse_collection_json,
    parse_footprint_json,
};
pub use metrics::{
    ComparisonRecord, FAILED, MetricRecord, Pairing, pair_records, parse_comparison_file,
    parse_metric_file,
};
pub use report::{
    CollectionMeta, CollectionReport, FootprintCollection, GroupResults, SyntaxErrorEntry, TestEntry, TestResult,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-width terminal report
    #[default]
    Text,
    /// JSON with the full classification
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "human" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
