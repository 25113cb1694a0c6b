#![warn(missing_docs)]
//! # Regbench
//!
//! Benchmark and regression harness for an external language runtime.
//!
//! Regbench drives the runtime as a black box, one short-lived process per
//! measurement, and compares the results against a stored baseline:
//! - **Process Isolation**: every storage, time and memory measurement is a
//!   fresh runtime process; a crashing test is recorded, never fatal
//! - **Two Phases**: collection writes raw output to JSON, reporting decodes
//!   and compares it without touching the runtime again
//! - **Three Axes**: heap bytes, resident pages and elapsed time, each with
//!   its own verdict and a `[bytes memory time]` marker
//! - **Noise Tolerance**: timing changes within ±15% are not flagged
//! - **Conformance**: the same suites double as expected-output checks
//! - **Footprint**: bare runtime startups timed under GNU time
//!
//! ## Quick Start
//!
//! ```text
//! regbench collect core -o baseline.json
//! # ... change the runtime ...
//! regbench collect core -o current.json
//! regbench compare baseline.json current.json
//! ```
//!
//! ## Classifying Programmatically
//!
//! ```
//! use regbench::prelude::*;
//!
//! let baseline = Snapshot::new(1000, 2.00, 8192);
//! let current = Snapshot::new(1200, 2.10, 8192);
//!
//! let c = classify(&baseline, &current);
//! assert_eq!(c.marker(), "+  ");
//! ```

// Re-export core types
pub use regbench_core::{
    FootprintRecord, InvocationBuilder, InvocationSpec, MeasurementKind, Namespace,
    NamespaceError, RuntimeLayout, Suite, SuiteEntry, SuiteError, SuiteGroup, TestCase,
    load_suite, parse_footprint, parse_group, parse_resident, parse_storage, parse_time,
};

// Re-export stats
pub use regbench_stats::{
    AxisComparison, Classification, ClassificationStatus, FootprintSummary, Snapshot,
    TIME_TOLERANCE, TrialSummary, Verdict, classify, summarize_footprint, summarize_trials,
};

// Re-export report types
pub use regbench_report::{
    Accumulator, CollectionReport, ComparisonRecord, FootprintCollection, MetricRecord,
    OutputFormat, SuiteReport, pair_records, parse_collection_json, parse_comparison_file,
    parse_footprint_json, parse_metric_file,
};

// Re-export the driver
pub use regbench_cli::{
    Cli, Commands, FailurePolicy, FootprintCommands, ProcessRunner, RawTrialOutput,
    RegbenchConfig, Runner, build_suite_report, collect_footprint, format_footprint,
    format_text_report, run_with_cli, summarize_collection, summarize_footprint_collection,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Classification, InvocationBuilder, MeasurementKind, MetricRecord, Namespace, Snapshot,
        Verdict, classify,
    };
}

/// Run the Regbench CLI harness.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     regbench::run()
/// }
/// ```
pub use regbench_cli::run;
