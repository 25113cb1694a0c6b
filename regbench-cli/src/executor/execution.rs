//! Metric Collection
//!
//! Drives the runtime through every test of a plan and records its raw
//! output. For each test:
//!
//! ```text
//! storage-delta ──failed──► abort marker, rest of the group skipped
//!       │
//!       ▼
//! time-delta × trials (failed trial = null sample)
//!       │
//!       ▼
//! mem-delta × 1
//! ```
//!
//! Invocations run strictly one after another; overlapping them would skew
//! the timing and memory numbers of the runtime under test.

use super::metadata::build_collection_meta;
use crate::planner::ExecutionPlan;
use crate::runner::{FailurePolicy, RawTrialOutput, Runner, RunnerError};
use indicatif::{ProgressBar, ProgressStyle};
use regbench_core::{InvocationBuilder, MeasurementKind, SuiteEntry, TestCase};
use regbench_report::{
    CollectionReport, GroupResults, SyntaxErrorEntry, TestEntry, TestResult,
};

/// Configuration for metric collection
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Timing trials per test
    pub trials: usize,
    /// Which signals mark an invocation as failed
    pub failure_policy: FailurePolicy,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            trials: 20,
            failure_policy: FailurePolicy::default(),
            show_progress: true,
        }
    }
}

/// Collects raw measurements for tests
pub struct MetricCollector<R: Runner> {
    builder: InvocationBuilder,
    runner: R,
    config: CollectionConfig,
    exceptions: usize,
    progress: ProgressBar,
}

impl<R: Runner> MetricCollector<R> {
    /// Collector driving `runner` with invocations from `builder`
    pub fn new(builder: InvocationBuilder, runner: R, config: CollectionConfig) -> Self {
        Self {
            builder,
            runner,
            config,
            exceptions: 0,
            progress: ProgressBar::hidden(),
        }
    }

    /// Invocations reported as exceptions so far
    pub fn exceptions(&self) -> usize {
        self.exceptions
    }

    /// Give back the runner
    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Collect every group of the plan
    pub fn collect_plan(&mut self, plan: &ExecutionPlan) -> Result<CollectionReport, RunnerError> {
        let meta = build_collection_meta(self.config.trials, self.builder.layout());

        let pb = progress_bar(plan.test_count(), self.config.show_progress);
        self.progress = pb.clone();

        let mut results = Vec::with_capacity(plan.groups.len());
        for group in &plan.groups {
            pb.set_message(format!("{}/{}", plan.namespace, group.name));
            let mut entries = Vec::with_capacity(group.entries.len());

            for (index, entry) in group.entries.iter().enumerate() {
                match entry {
                    SuiteEntry::SyntaxError { line, fields } => {
                        pb.suspend(|| {
                            tracing::warn!("{}/{}:{} test syntax", plan.namespace, group.name, line)
                        });
                        entries.push(TestEntry::SyntaxError(SyntaxErrorEntry {
                            line: *line,
                            fields: fields.clone(),
                        }));
                    }
                    SuiteEntry::Test(test) => {
                        let result = self.collect(test)?;
                        pb.inc(1);
                        let failed = result.is_failed();
                        entries.push(TestEntry::Measured(result));
                        if failed {
                            let skipped = group.entries[index + 1..]
                                .iter()
                                .filter(|e| matches!(e, SuiteEntry::Test(_)))
                                .count();
                            pb.suspend(|| {
                                tracing::info!(
                                    "{}: storage measurement failed, skipping {} tests",
                                    test.location(),
                                    skipped
                                )
                            });
                            pb.inc(skipped as u64);
                            break;
                        }
                    }
                }
            }

            results.push(GroupResults {
                group: group.name.clone(),
                results: entries,
            });
        }

        pb.finish_with_message("Complete");

        Ok(CollectionReport {
            meta: Some(meta),
            ns: plan.namespace.to_string(),
            results,
        })
    }

    /// Collect storage, timing trials and memory for one test
    pub fn collect(&mut self, test: &TestCase) -> Result<TestResult, RunnerError> {
        let Some(storage) = self.measure(test, MeasurementKind::Storage)? else {
            return Ok(TestResult::storage_failed(test.line));
        };

        let mut times = Vec::with_capacity(self.config.trials);
        for _ in 0..self.config.trials {
            times.push(self.measure(test, MeasurementKind::Time)?);
        }

        let mem_virt = self.measure(test, MeasurementKind::Memory)?;

        Ok(TestResult {
            line: test.line,
            storage: Some(storage),
            times,
            mem_virt,
        })
    }

    fn measure(
        &mut self,
        test: &TestCase,
        kind: MeasurementKind,
    ) -> Result<Option<String>, RunnerError> {
        let invocation = self.builder.build(test.namespace, kind, &test.expression);
        let output = self.runner.run(&invocation)?;

        if self.config.failure_policy.is_failure(&output) {
            self.exceptions += 1;
            self.progress.suspend(|| {
                eprintln!(
                    "exception: {}/{}:{:<5} {}",
                    test.namespace,
                    test.group,
                    test.line,
                    failure_detail(&output)
                )
            });
            return Ok(None);
        }

        Ok(Some(output.stdout))
    }
}

/// Bar over `len` steps, hidden unless `visible`
pub(crate) fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    let pb = if visible {
        ProgressBar::new(len as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

pub(crate) fn failure_detail(output: &RawTrialOutput) -> String {
    if !output.stderr.is_empty() {
        return output.stderr.trim_end().to_string();
    }
    match output.status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}
