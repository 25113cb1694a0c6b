//! Suite Definitions
//!
//! A namespace directory holds a `tests` index naming one group file per
//! line. Each group file holds one test per line as
//! `expression<TAB>expected_result`; any other shape is a syntax error and
//! is kept in place so that line numbers stay meaningful.

use crate::SUITE_INDEX;
use crate::namespace::Namespace;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One test expression and its identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Namespace the test belongs to
    pub namespace: Namespace,
    /// Group file name
    pub group: String,
    /// 1-based line number inside the group file
    pub line: usize,
    /// Expression text handed to the runtime
    pub expression: String,
    /// Printed result the expression is expected to produce
    pub expected: String,
}

impl TestCase {
    /// `ns/group` label used in metric records
    pub fn label(&self) -> String {
        format!("{}/{}", self.namespace, self.group)
    }

    /// `ns/group:line`, enough to locate the test on disk
    pub fn location(&self) -> String {
        format!("{}/{}:{}", self.namespace, self.group, self.line)
    }
}

/// A parsed line of a group file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteEntry {
    /// A well-formed test
    Test(TestCase),
    /// A line without exactly one tab-separated pair
    SyntaxError {
        /// 1-based line number
        line: usize,
        /// The tab-separated fields that were found
        fields: Vec<String>,
    },
}

impl SuiteEntry {
    /// Line number of this entry
    pub fn line(&self) -> usize {
        match self {
            SuiteEntry::Test(test) => test.line,
            SuiteEntry::SyntaxError { line, .. } => *line,
        }
    }
}

/// One group file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteGroup {
    /// Group file name
    pub name: String,
    /// Entries in file order
    pub entries: Vec<SuiteEntry>,
}

impl SuiteGroup {
    /// Well-formed tests in file order
    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.entries.iter().filter_map(|entry| match entry {
            SuiteEntry::Test(test) => Some(test),
            SuiteEntry::SyntaxError { .. } => None,
        })
    }

    /// Number of syntax-error lines
    pub fn syntax_errors(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, SuiteEntry::SyntaxError { .. }))
            .count()
    }
}

/// All groups of one namespace, in index order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// Namespace the suite was loaded for
    pub namespace: Namespace,
    /// Groups in index order
    pub groups: Vec<SuiteGroup>,
}

impl Suite {
    /// Total number of well-formed tests
    pub fn test_count(&self) -> usize {
        self.groups.iter().map(|g| g.tests().count()).sum()
    }
}

/// Failure to read a suite definition
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The index or a group file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Parse the contents of one group file.
///
/// Blank lines are skipped but still advance the line counter.
pub fn parse_group(namespace: Namespace, group: &str, source: &str) -> SuiteGroup {
    let entries = source
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| {
            let line = index + 1;
            let fields: Vec<&str> = text.split('\t').collect();
            match fields.as_slice() {
                [expression, expected] => SuiteEntry::Test(TestCase {
                    namespace,
                    group: group.to_string(),
                    line,
                    expression: expression.to_string(),
                    expected: expected.to_string(),
                }),
                _ => SuiteEntry::SyntaxError {
                    line,
                    fields: fields.iter().map(|f| f.to_string()).collect(),
                },
            }
        })
        .collect();

    SuiteGroup {
        name: group.to_string(),
        entries,
    }
}

/// Load `<root>/<namespace>/tests` and every group file it names
pub fn load_suite(root: &Path, namespace: Namespace) -> Result<Suite, SuiteError> {
    let dir = root.join(namespace.as_str());
    let index_path = dir.join(SUITE_INDEX);
    let index = read(&index_path)?;

    let mut groups = Vec::new();
    for name in index.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let source = read(&dir.join(name))?;
        let group = parse_group(namespace, name, &source);
        tracing::debug!(
            "loaded {}/{}: {} tests, {} syntax errors",
            namespace,
            name,
            group.tests().count(),
            group.syntax_errors()
        );
        groups.push(group);
    }

    Ok(Suite { namespace, groups })
}

fn read(path: &Path) -> Result<String, SuiteError> {
    std::fs::read_to_string(path).map_err(|source| SuiteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
