//! Suite Executor
//!
//! Runs suites against the runtime and turns the collected output into
//! reports. Collection and reporting are separate phases joined only by the
//! collection JSON, so a report can be regenerated without re-running a
//! single test.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ExecutionPlan (suite groups after filtering)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  storage / time × N / mem per test     ──► collection JSON
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  decode records, average trials (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  classify against baseline, accumulate totals
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  fixed-width performance report
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Metric collection, one invocation at a time
//! - [`conformance`] - Expected-output runs of the same suites
//! - [`footprint`] - Repeated bare startups under GNU time
//! - [`statistics`] - Parallel decoding of collected output
//! - [`report`] - Classification and aggregation
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - Collection metadata

mod conformance;
mod execution;
mod footprint;
mod formatting;
mod metadata;
mod report;
mod statistics;

// Re-export public API
pub use conformance::{
    ConformanceCounts, ConformanceGroup, ConformanceReport, ConformanceResult, run_conformance,
};
pub use execution::{CollectionConfig, MetricCollector};
pub use footprint::{collect_footprint, summarize_footprint_collection};
pub use formatting::{
    format_conformance, format_footprint, format_plan, format_report_line, format_text_report,
};
pub use metadata::build_collection_meta;
pub use report::build_suite_report;
pub use statistics::{SummarizedTest, summarize_collection};
