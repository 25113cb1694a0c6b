//! Report Building
//!
//! Classifies every baseline/current pair and folds the results into a
//! [`SuiteReport`].
//!
//! ## Pipeline
//!
//! ```text
//! ComparisonRecord (baseline + current)
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │ Parallel classify   │  pure per-test verdicts
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │    Accumulator      │  sequence numbers, totals (input order)
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!         SuiteReport
//! ```

use rayon::prelude::*;
use regbench_report::{Accumulator, ComparisonRecord, SuiteReport};
use regbench_stats::{Classification, classify};

/// Build a suite report from paired records
///
/// # Arguments
/// * `records` - Baseline/current pairs, in report order
/// * `unmatched` - Tests that appeared in only one of the runs
/// * `show_unchanged` - List tests with no flagged axis
pub fn build_suite_report(
    records: &[ComparisonRecord],
    unmatched: usize,
    show_unchanged: bool,
) -> SuiteReport {
    let classifications: Vec<Classification> = records
        .par_iter()
        .map(|record| classify(&record.baseline, &record.current))
        .collect();

    let mut accumulator = Accumulator::new(show_unchanged);
    for (record, classification) in records.iter().zip(classifications) {
        accumulator.accumulate(&record.name, classification);
    }
    accumulator.record_unmatched(unmatched);

    let report = accumulator.finalize();
    tracing::info!(
        "Compared {} tests: {} bytes, {} pages, {} times changed",
        report.totals.tests,
        report.totals.bytes_changed,
        report.totals.memory_changed,
        report.totals.time_changed
    );
    report
}
