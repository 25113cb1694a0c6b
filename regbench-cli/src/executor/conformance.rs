//! Conformance Runs
//!
//! Evaluates each `expression<TAB>expected` pair once, without a
//! measurement wrapper, and compares what the runtime printed with the
//! expected text.

use crate::planner::ExecutionPlan;
use crate::runner::{FailurePolicy, Runner, RunnerError};
use regbench_core::{InvocationBuilder, SuiteEntry};
use regbench_report::SyntaxErrorEntry;
use serde::{Deserialize, Serialize};

/// Outcome of one conformance test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceResult {
    /// Line in the group file
    pub line: usize,
    /// The runtime reported an exception
    pub exception: bool,
    /// Printed result matched the expected text
    pub pass: bool,
    /// Expected text
    pub expect: String,
    /// Printed result
    pub obtain: String,
}

/// Conformance outcomes of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceGroup {
    /// Group file name
    pub group: String,
    /// Results in file order
    pub results: Vec<ConformanceResult>,
    /// Lines that were not valid tests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syntax_errors: Vec<SyntaxErrorEntry>,
}

/// Per-group counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConformanceCounts {
    /// Tests run
    pub total: usize,
    /// Tests whose output matched
    pub passed: usize,
    /// Tests whose output did not match
    pub failed: usize,
    /// Tests the runtime rejected
    pub exceptions: usize,
}

impl std::ops::AddAssign for ConformanceCounts {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.exceptions += other.exceptions;
    }
}

impl ConformanceGroup {
    /// Count outcomes
    pub fn counts(&self) -> ConformanceCounts {
        let total = self.results.len();
        let passed = self.results.iter().filter(|r| r.pass).count();
        let exceptions = self.results.iter().filter(|r| r.exception).count();
        ConformanceCounts {
            total,
            passed,
            failed: total - passed - exceptions,
            exceptions,
        }
    }
}

/// Conformance outcomes of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Namespace name
    pub module: String,
    /// Groups in index order
    pub results: Vec<ConformanceGroup>,
}

impl ConformanceReport {
    /// Counts across all groups
    pub fn totals(&self) -> ConformanceCounts {
        let mut totals = ConformanceCounts::default();
        for group in &self.results {
            totals += group.counts();
        }
        totals
    }
}

/// Run every test of the plan once
pub fn run_conformance<R: Runner>(
    builder: &InvocationBuilder,
    runner: &mut R,
    policy: FailurePolicy,
    plan: &ExecutionPlan,
) -> Result<ConformanceReport, RunnerError> {
    let mut results = Vec::with_capacity(plan.groups.len());

    for group in &plan.groups {
        let mut outcomes = Vec::new();
        let mut syntax_errors = Vec::new();

        for entry in &group.entries {
            match entry {
                SuiteEntry::SyntaxError { line, fields } => syntax_errors.push(SyntaxErrorEntry {
                    line: *line,
                    fields: fields.clone(),
                }),
                SuiteEntry::Test(test) => {
                    let invocation = builder.build_eval(test.namespace, &test.expression);
                    let output = runner.run(&invocation)?;
                    let exception = policy.is_failure(&output);
                    if exception {
                        eprintln!(
                            "exception: {}/{}:{:<5} {}",
                            test.namespace,
                            test.group,
                            test.line,
                            output.stderr.trim_end()
                        );
                    }

                    outcomes.push(ConformanceResult {
                        line: test.line,
                        exception,
                        pass: !exception && output.stdout == test.expected,
                        expect: test.expected.clone(),
                        obtain: output.stdout,
                    });
                }
            }
        }

        results.push(ConformanceGroup {
            group: group.name.clone(),
            results: outcomes,
            syntax_errors,
        });
    }

    Ok(ConformanceReport {
        module: plan.namespace.to_string(),
        results,
    })
}
