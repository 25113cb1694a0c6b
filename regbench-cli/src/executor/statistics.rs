//! Metric Summarization
//!
//! Decodes the raw runtime output stored in a collection file and reduces
//! each test to one [`MetricRecord`]. Uses Rayon to decode tests in
//! parallel; this only ever runs in the reporting phase, after every
//! runtime process has exited.
//!
//! A test with no usable storage record or no successful timing trial is
//! emitted with `-1` on every axis so that a later comparison marks it
//! `*` instead of reading it as an improvement.

use rayon::prelude::*;
use regbench_core::{parse_resident, parse_storage, parse_time};
use regbench_report::{CollectionReport, FAILED, MetricRecord, TestResult};
use regbench_stats::{TrialSummary, summarize_trials};

/// One test reduced to its metrics
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizedTest {
    /// Metric line
    pub record: MetricRecord,
    /// Spread of the timing trials, when any succeeded
    pub trials: Option<TrialSummary>,
}

/// Summarize every measured test of a collection, in collection order
pub fn summarize_collection(collection: &CollectionReport) -> Vec<SummarizedTest> {
    let tests: Vec<_> = collection.measured().collect();

    tests
        .par_iter()
        .map(|(group, result)| {
            let name = format!("{}/{}", collection.ns, group);
            summarize_test(name, result)
        })
        .collect()
}

fn summarize_test(name: String, result: &TestResult) -> SummarizedTest {
    let Some(bytes) = result
        .storage
        .as_deref()
        .and_then(parse_storage)
        .map(|s| s.total_bytes())
    else {
        return SummarizedTest {
            record: MetricRecord::failed(name, result.line),
            trials: None,
        };
    };

    let samples: Vec<Option<f64>> = result
        .times
        .iter()
        .map(|t| t.as_deref().and_then(parse_time))
        .collect();
    let Some(trials) = summarize_trials(&samples) else {
        return SummarizedTest {
            record: MetricRecord::failed(name, result.line),
            trials: None,
        };
    };

    let mem = result
        .mem_virt
        .as_deref()
        .and_then(parse_resident)
        .map_or(FAILED, |m| m.bytes);

    SummarizedTest {
        record: MetricRecord {
            name,
            line: result.line,
            bytes,
            time: trials.mean,
            mem,
        },
        trials: Some(trials),
    }
}
