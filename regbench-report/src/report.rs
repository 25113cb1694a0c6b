//! Collection Data Structures
//!
//! The collection phase writes one JSON document per namespace:
//!
//! ```json
//! {"ns": "core", "results": [{"group": "lists", "results": [
//!     {"line": 1, "storage": "...", "times": ["0.5", null], "mem_virt": "8192"}
//! ]}]}
//! ```
//!
//! Raw runtime output is stored verbatim so that the reporting phase can
//! re-decode it without re-running anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of one collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    /// Run metadata; absent in files written by older collectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<CollectionMeta>,
    /// Namespace name
    pub ns: String,
    /// Groups in suite order
    pub results: Vec<GroupResults>,
}

impl CollectionReport {
    /// Measured tests in suite order, with their group name
    pub fn measured(&self) -> impl Iterator<Item = (&str, &TestResult)> {
        self.results.iter().flat_map(|group| {
            group
                .results
                .iter()
                .filter_map(move |entry| match entry {
                    TestEntry::Measured(result) => Some((group.group.as_str(), result)),
                    TestEntry::SyntaxError(_) => None,
                })
        })
    }
}

/// Metadata describing how a collection was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMeta {
    /// regbench version
    pub version: String,
    /// Start of the run
    pub timestamp: DateTime<Utc>,
    /// Timing trials per test
    pub trials: usize,
    /// Runtime binary that was driven
    pub runtime: String,
    /// Commit of the working tree, when run inside a git checkout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
}

/// Results of one group file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResults {
    /// Group file name
    pub group: String,
    /// Entries in file order
    pub results: Vec<TestEntry>,
}

/// One entry of a group's result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestEntry {
    /// Line that was not a valid test
    SyntaxError(SyntaxErrorEntry),
    /// Measured (or failed) test
    Measured(TestResult),
}

/// Malformed suite line, recorded instead of executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxErrorEntry {
    /// 1-based line number
    pub line: usize,
    /// Fields found on the line
    #[serde(rename = "test syntax")]
    pub fields: Vec<String>,
}

/// Raw measurements of one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// 1-based line number
    pub line: usize,
    /// Storage-delta output; `null` when the measurement failed
    pub storage: Option<String>,
    /// One entry per timing trial; `null` for a failed trial
    #[serde(default)]
    pub times: Vec<Option<String>>,
    /// Memory-delta output; `null` when the measurement failed
    #[serde(default)]
    pub mem_virt: Option<String>,
}

impl TestResult {
    /// Marker entry for a test whose storage measurement failed
    pub fn storage_failed(line: usize) -> Self {
        Self {
            line,
            storage: None,
            times: Vec::new(),
            mem_virt: None,
        }
    }

    /// Whether the storage measurement failed
    pub fn is_failed(&self) -> bool {
        self.storage.is_none()
    }
}

/// Output of one footprint collection run
///
/// ```json
/// {"stats": ["0.01 0.03 0.05 14336 2 4096", null]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintCollection {
    /// Run metadata; `trials` holds the number of startup runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<CollectionMeta>,
    /// Raw time report per run; `null` for a failed run
    pub stats: Vec<Option<String>>,
}
