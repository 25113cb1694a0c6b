//! Metric Line Files
//!
//! Two line-oriented formats sit between the phases:
//!
//! - per-test metric lines, `line name bytes time mem`, one file per run
//! - comparison lines, `name base_bytes base_time base_mem bytes time mem`
//!   (or the byte-only `name base_bytes base_time bytes time`)
//!
//! Records with any other field count, or with a field that does not parse,
//! are skipped without complaint. Header lines fall out the same way.

use fxhash::FxHashMap;
use regbench_stats::Snapshot;
use serde::{Deserialize, Serialize};

/// Value written for an axis whose measurement failed
pub const FAILED: i64 = -1;

/// Summarized metrics of one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Test label, `ns/group`
    pub name: String,
    /// Line number in the group file
    pub line: usize,
    /// Heap bytes
    pub bytes: i64,
    /// Mean seconds
    pub time: f64,
    /// Resident bytes
    pub mem: i64,
}

impl MetricRecord {
    /// Record for a test that could not be measured
    pub fn failed(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            bytes: FAILED,
            time: FAILED as f64,
            mem: FAILED,
        }
    }

    /// Render as a metric line
    pub fn to_line(&self) -> String {
        format!(
            "{:02} {:<18} {:>6} {:8.2} {}",
            self.line, self.name, self.bytes, self.time, self.mem
        )
    }

    /// Parse a metric line
    pub fn parse_line(text: &str) -> Option<Self> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let [line, name, bytes, time, mem] = fields.as_slice() else {
            return None;
        };

        Some(Self {
            name: name.to_string(),
            line: line.parse().ok()?,
            bytes: bytes.parse().ok()?,
            time: time.parse().ok()?,
            mem: mem.parse().ok()?,
        })
    }

    /// Full metric snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.bytes, self.time, self.mem)
    }
}

/// Parse every valid metric line of a file
pub fn parse_metric_file(text: &str) -> Vec<MetricRecord> {
    text.lines().filter_map(MetricRecord::parse_line).collect()
}

/// Baseline and current metrics of one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// Test label
    pub name: String,
    /// Stored baseline
    pub baseline: Snapshot,
    /// Current run
    pub current: Snapshot,
}

impl ComparisonRecord {
    /// Parse a seven-field or five-field comparison line
    pub fn parse_line(text: &str) -> Option<Self> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        match fields.as_slice() {
            [name, base_bytes, base_time, base_mem, bytes, time, mem] => Some(Self {
                name: name.to_string(),
                baseline: Snapshot::new(
                    base_bytes.parse().ok()?,
                    base_time.parse().ok()?,
                    base_mem.parse().ok()?,
                ),
                current: Snapshot::new(bytes.parse().ok()?, time.parse().ok()?, mem.parse().ok()?),
            }),
            [name, base_bytes, base_time, bytes, time] => {
                base_time.parse::<f64>().ok()?;
                time.parse::<f64>().ok()?;
                Some(Self {
                    name: name.to_string(),
                    baseline: Snapshot::bytes_only(base_bytes.parse().ok()?),
                    current: Snapshot::bytes_only(bytes.parse().ok()?),
                })
            }
            _ => None,
        }
    }

    /// Render as a seven-field comparison line
    pub fn to_line(&self) -> String {
        let b = &self.baseline;
        let c = &self.current;
        format!(
            "{} {} {:.2} {} {} {:.2} {}",
            self.name,
            b.bytes,
            b.time.unwrap_or(0.0),
            b.mem.unwrap_or(0),
            c.bytes,
            c.time.unwrap_or(0.0),
            c.mem.unwrap_or(0)
        )
    }
}

/// Parse every valid comparison line of a file
pub fn parse_comparison_file(text: &str) -> Vec<ComparisonRecord> {
    text.lines().filter_map(ComparisonRecord::parse_line).collect()
}

/// Result of joining a baseline run with a current run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    /// Matched tests, in current-run order
    pub records: Vec<ComparisonRecord>,
    /// Baseline tests absent from the current run
    pub unmatched_baseline: usize,
    /// Current tests absent from the baseline
    pub unmatched_current: usize,
}

impl Pairing {
    /// Tests present on one side only
    pub fn unmatched(&self) -> usize {
        self.unmatched_baseline + self.unmatched_current
    }
}

/// Join two runs on `(name, line)`
pub fn pair_records(baseline: &[MetricRecord], current: &[MetricRecord]) -> Pairing {
    let mut index: FxHashMap<(&str, usize), &MetricRecord> = FxHashMap::default();
    for record in baseline {
        index.entry((record.name.as_str(), record.line)).or_insert(record);
    }

    let mut pairing = Pairing::default();
    for record in current {
        match index.remove(&(record.name.as_str(), record.line)) {
            Some(base) => pairing.records.push(ComparisonRecord {
                name: record.name.clone(),
                baseline: base.snapshot(),
                current: record.snapshot(),
            }),
            None => {
                tracing::warn!("{}:{} has no baseline", record.name, record.line);
                pairing.unmatched_current += 1;
            }
        }
    }
    pairing.unmatched_baseline = index.len();

    pairing
}
