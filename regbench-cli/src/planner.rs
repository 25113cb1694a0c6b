//! Suite Planner
//!
//! Builds the execution plan for one namespace by filtering its groups.
//!
//! Filtering options:
//! - Regex pattern matching on the group name
//!
//! Ordering: groups keep the order of the namespace's `tests` index, and
//! tests keep their file order, so that line numbers and sequence numbers
//! line up between runs.

use regbench_core::{Namespace, Suite, SuiteGroup, TestCase};

/// Execution plan for one namespace
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Namespace being run
    pub namespace: Namespace,
    /// Selected groups, in index order
    pub groups: Vec<SuiteGroup>,
}

impl ExecutionPlan {
    /// Well-formed tests across all selected groups
    pub fn test_count(&self) -> usize {
        self.groups.iter().map(|g| g.tests().count()).sum()
    }

    /// Syntax-error lines across all selected groups
    pub fn syntax_error_count(&self) -> usize {
        self.groups.iter().map(|g| g.syntax_errors()).sum()
    }

    /// Tests in execution order
    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.groups.iter().flat_map(|g| g.tests())
    }
}

/// Build the execution plan from a loaded suite
pub fn build_plan(suite: Suite, filter: Option<&regex::Regex>) -> ExecutionPlan {
    let groups = suite
        .groups
        .into_iter()
        .filter(|group| filter.is_none_or(|re| re.is_match(&group.name)))
        .collect();

    ExecutionPlan {
        namespace: suite.namespace,
        groups,
    }
}
