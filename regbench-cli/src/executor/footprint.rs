//! Startup Footprint
//!
//! Starts the bare runtime repeatedly under GNU time and keeps each run's
//! time report. Time always writes to stderr, so a run counts as failed only
//! on a non-zero exit status.

use super::execution::{failure_detail, progress_bar};
use super::metadata::build_collection_meta;
use crate::runner::{Runner, RunnerError};
use regbench_core::{InvocationBuilder, parse_footprint};
use regbench_report::FootprintCollection;
use regbench_stats::{FootprintSummary, summarize_footprint};
use std::path::Path;

/// Run `runs` bare startups and keep their time reports
pub fn collect_footprint<R: Runner>(
    builder: &InvocationBuilder,
    runner: &mut R,
    time_binary: &Path,
    runs: usize,
    show_progress: bool,
) -> Result<FootprintCollection, RunnerError> {
    let meta = build_collection_meta(runs, builder.layout());
    let invocation = builder.build_startup(time_binary);

    let pb = progress_bar(runs, show_progress);
    pb.set_message("footprint");

    let mut stats = Vec::with_capacity(runs);
    for run in 1..=runs {
        let output = runner.run(&invocation)?;
        pb.inc(1);

        if !output.success {
            pb.suspend(|| eprintln!("exception: footprint run {:<5} {}", run, failure_detail(&output)));
            stats.push(None);
            continue;
        }

        let report = output
            .stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string());
        stats.push(report);
    }

    pb.finish_with_message("Complete");

    Ok(FootprintCollection {
        meta: Some(meta),
        stats,
    })
}

/// Decode and average a footprint collection.
///
/// Reports that do not decode count as failed runs.
pub fn summarize_footprint_collection(collection: &FootprintCollection) -> Option<FootprintSummary> {
    let runs: Vec<_> = collection
        .stats
        .iter()
        .map(|stat| stat.as_deref().and_then(parse_footprint))
        .collect();
    summarize_footprint(&runs)
}
