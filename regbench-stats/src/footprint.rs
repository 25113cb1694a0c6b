//! Startup Footprint Summary
//!
//! Means over repeated startup runs. Failed runs arrive as `None` and are
//! counted like failed timing trials.

use regbench_core::FootprintRecord;
use serde::{Deserialize, Serialize};

/// Mean footprint of repeated runtime startups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintSummary {
    /// Mean system CPU seconds
    pub system: f64,
    /// Mean user CPU seconds
    pub user: f64,
    /// Mean elapsed seconds
    pub elapsed: f64,
    /// Mean maximum resident set, KiB
    pub resident_kb: f64,
    /// Mean voluntary context switches
    pub waits: f64,
    /// Runs that produced a report
    pub successes: usize,
    /// Runs that failed
    pub failures: usize,
}

/// Average the successful runs, or `None` when none succeeded
pub fn summarize_footprint(runs: &[Option<FootprintRecord>]) -> Option<FootprintSummary> {
    let records: Vec<&FootprintRecord> = runs.iter().flatten().collect();
    if records.is_empty() {
        return None;
    }

    let n = records.len() as f64;
    let mean = |field: fn(&FootprintRecord) -> f64| records.iter().map(|r| field(r)).sum::<f64>() / n;

    Some(FootprintSummary {
        system: mean(|r| r.system),
        user: mean(|r| r.user),
        elapsed: mean(|r| r.elapsed),
        resident_kb: mean(|r| r.resident_kb as f64),
        waits: mean(|r| r.waits as f64),
        successes: records.len(),
        failures: runs.len() - records.len(),
    })
}
