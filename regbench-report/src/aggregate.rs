//! Suite Aggregation
//!
//! Folds per-test classifications into a [`SuiteReport`]. All running state
//! lives in the [`Accumulator`]; callers feed it tests in report order and
//! finalize it once.

use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use regbench_stats::{Classification, Verdict};
use serde::{Deserialize, Serialize};

/// One reported test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Three-character `bytes memory time` marker
    pub marker: String,
    /// Occurrence of this name among consecutive tests with the same name
    pub sequence: usize,
    /// Test label
    pub name: String,
    /// Full classification
    pub classification: Classification,
}

/// Counts for one test label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupTotals {
    /// Test label
    pub name: String,
    /// Tests seen
    pub tests: usize,
    /// Tests skipped for a zero baseline
    pub skipped: usize,
    /// Tests flagged on any axis
    pub flagged: usize,
}

/// Suite-wide totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Tests seen, skipped ones included
    pub tests: usize,
    /// Tests skipped for a zero baseline
    pub skipped: usize,
    /// Tests with a bytes change
    pub bytes_changed: usize,
    /// Tests with a page change
    pub memory_changed: usize,
    /// Tests with a time change beyond tolerance
    pub time_changed: usize,
    /// Summed byte deltas of flagged tests
    pub delta_bytes: i64,
    /// Summed page deltas of flagged tests
    pub delta_pages: i64,
    /// Summed time deltas of flagged tests
    pub delta_time: f64,
    /// Tests present in only one of the compared runs
    pub unmatched: usize,
}

/// Finalized comparison report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// When the report was produced
    pub timestamp: DateTime<Utc>,
    /// Reported tests, in input order
    pub lines: Vec<ReportLine>,
    /// Per-label counts, in order of first appearance
    pub groups: Vec<GroupTotals>,
    /// Suite totals
    pub totals: ReportTotals,
}

impl SuiteReport {
    /// Whether any compared test was flagged
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|line| line.classification.is_flagged())
    }
}

/// Running state of one report
#[derive(Debug)]
pub struct Accumulator {
    show_unchanged: bool,
    timestamp: DateTime<Utc>,
    previous: Option<String>,
    sequence: usize,
    lines: Vec<ReportLine>,
    groups: Vec<GroupTotals>,
    group_index: FxHashMap<String, usize>,
    totals: ReportTotals,
}

impl Accumulator {
    /// Start a report; unchanged tests are listed only with `show_unchanged`
    pub fn new(show_unchanged: bool) -> Self {
        Self::at(show_unchanged, Utc::now())
    }

    /// Start a report with a fixed timestamp
    pub fn at(show_unchanged: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            show_unchanged,
            timestamp,
            previous: None,
            sequence: 0,
            lines: Vec::new(),
            groups: Vec::new(),
            group_index: FxHashMap::default(),
            totals: ReportTotals::default(),
        }
    }

    /// Fold in one classified test
    pub fn accumulate(&mut self, name: &str, classification: Classification) {
        self.totals.tests += 1;
        let group = self.group_slot(name);
        self.groups[group].tests += 1;

        if classification.is_skipped() {
            self.groups[group].skipped += 1;
            self.totals.skipped += 1;
            return;
        }

        if self.previous.as_deref() == Some(name) {
            self.sequence += 1;
        } else {
            self.sequence = 1;
            self.previous = Some(name.to_string());
        }

        let flagged = classification.is_flagged();
        if flagged {
            self.groups[group].flagged += 1;
            self.add_deltas(&classification);
        }

        if flagged || self.show_unchanged {
            self.lines.push(ReportLine {
                marker: classification.marker(),
                sequence: self.sequence,
                name: name.to_string(),
                classification,
            });
        }
    }

    /// Record tests that could not be paired with a baseline
    pub fn record_unmatched(&mut self, count: usize) {
        self.totals.unmatched += count;
    }

    /// Totals so far
    pub fn totals(&self) -> &ReportTotals {
        &self.totals
    }

    /// Produce the report
    pub fn finalize(self) -> SuiteReport {
        SuiteReport {
            timestamp: self.timestamp,
            lines: self.lines,
            groups: self.groups,
            totals: self.totals,
        }
    }

    fn group_slot(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.group_index.get(name) {
            return slot;
        }
        self.groups.push(GroupTotals {
            name: name.to_string(),
            ..GroupTotals::default()
        });
        let slot = self.groups.len() - 1;
        self.group_index.insert(name.to_string(), slot);
        slot
    }

    /// Corrupt axes are counted as changed but carry no delta
    fn add_deltas(&mut self, classification: &Classification) {
        let totals = &mut self.totals;

        if let Some(bytes) = &classification.bytes {
            if bytes.verdict.is_changed() {
                totals.bytes_changed += 1;
            }
            if bytes.verdict != Verdict::Corrupt {
                totals.delta_bytes = totals.delta_bytes.saturating_add(bytes.delta);
            }
        }
        if let Some(memory) = &classification.memory {
            if memory.verdict.is_changed() {
                totals.memory_changed += 1;
            }
            if memory.verdict != Verdict::Corrupt {
                totals.delta_pages = totals.delta_pages.saturating_add(memory.delta);
            }
        }
        if let Some(time) = &classification.time {
            if time.verdict.is_changed() {
                totals.time_changed += 1;
            }
            if time.verdict != Verdict::Corrupt {
                totals.delta_time += time.delta;
            }
        }
    }
}
