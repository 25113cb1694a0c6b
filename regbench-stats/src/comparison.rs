//! Baseline Classification
//!
//! Compares one test's current metrics against its baseline along three
//! independent axes:
//!
//! - **bytes**: any difference is a change; a zero baseline means the test
//!   was never measured and the whole comparison is skipped
//! - **pages**: resident memory rounded up to 4096-byte pages, any
//!   difference is a change
//! - **time**: only ratios outside `1 ± TIME_TOLERANCE` are a change
//!
//! Negative values on either side can only come from a failed measurement
//! and get the `*` marker instead of being read as a change.

use crate::TIME_TOLERANCE;
use regbench_core::resident_pages;
use serde::{Deserialize, Serialize};

/// Verdict for one metric axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Within tolerance, or not compared
    Unchanged,
    /// Grew / got slower
    Increased,
    /// Shrank / got faster
    Decreased,
    /// Physically impossible current value
    Corrupt,
}

impl Verdict {
    /// Single-character marker used in the report
    pub fn marker(self) -> char {
        match self {
            Verdict::Unchanged => ' ',
            Verdict::Increased => '+',
            Verdict::Decreased => '-',
            Verdict::Corrupt => '*',
        }
    }

    /// Whether this verdict flags the axis
    pub fn is_changed(self) -> bool {
        self != Verdict::Unchanged
    }

    fn from_sign<T: PartialOrd>(current: T, baseline: T) -> Verdict {
        if current < baseline {
            Verdict::Decreased
        } else {
            Verdict::Increased
        }
    }
}

/// Metrics of one test at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Heap bytes
    pub bytes: i64,
    /// Mean elapsed seconds, when compared
    pub time: Option<f64>,
    /// Resident bytes, when compared
    pub mem: Option<i64>,
}

impl Snapshot {
    /// Snapshot carrying all three axes
    pub fn new(bytes: i64, time: f64, mem: i64) -> Self {
        Self {
            bytes,
            time: Some(time),
            mem: Some(mem),
        }
    }

    /// Snapshot for byte-only comparison
    pub fn bytes_only(bytes: i64) -> Self {
        Self {
            bytes,
            time: None,
            mem: None,
        }
    }
}

/// Baseline/current pair for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisComparison<T> {
    /// Baseline value
    pub baseline: T,
    /// Current value
    pub current: T,
    /// `current - baseline`
    pub delta: T,
    /// `current / baseline`, absent for a zero baseline
    pub ratio: Option<f64>,
    /// Verdict for this axis
    pub verdict: Verdict,
}

/// Whether a comparison took place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationStatus {
    /// All available axes were compared
    Compared,
    /// Baseline bytes were zero; nothing compared
    SkippedZeroBaseline,
}

/// Result of classifying one test against its baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Whether the test was compared at all
    pub status: ClassificationStatus,
    /// Heap bytes
    pub bytes: Option<AxisComparison<i64>>,
    /// Resident pages
    pub memory: Option<AxisComparison<i64>>,
    /// Elapsed seconds
    pub time: Option<AxisComparison<f64>>,
}

impl Classification {
    fn skipped() -> Self {
        Self {
            status: ClassificationStatus::SkippedZeroBaseline,
            bytes: None,
            memory: None,
            time: None,
        }
    }

    /// Bytes verdict (unchanged when not compared)
    pub fn bytes_verdict(&self) -> Verdict {
        self.bytes.map_or(Verdict::Unchanged, |a| a.verdict)
    }

    /// Memory verdict (unchanged when not compared)
    pub fn memory_verdict(&self) -> Verdict {
        self.memory.map_or(Verdict::Unchanged, |a| a.verdict)
    }

    /// Time verdict (unchanged when not compared)
    pub fn time_verdict(&self) -> Verdict {
        self.time.map_or(Verdict::Unchanged, |a| a.verdict)
    }

    /// Three-character `bytes memory time` marker; all blank when unchanged
    pub fn marker(&self) -> String {
        [
            self.bytes_verdict(),
            self.memory_verdict(),
            self.time_verdict(),
        ]
        .iter()
        .map(|v| v.marker())
        .collect()
    }

    /// Whether any axis is flagged
    pub fn is_flagged(&self) -> bool {
        self.bytes_verdict().is_changed()
            || self.memory_verdict().is_changed()
            || self.time_verdict().is_changed()
    }

    /// Whether the comparison was skipped
    pub fn is_skipped(&self) -> bool {
        self.status == ClassificationStatus::SkippedZeroBaseline
    }
}

/// Classify `current` against `baseline`
pub fn classify(baseline: &Snapshot, current: &Snapshot) -> Classification {
    if baseline.bytes == 0 {
        return Classification::skipped();
    }

    let memory = match (baseline.mem, current.mem) {
        (Some(base), Some(cur)) => Some(classify_pages(base, cur)),
        _ => None,
    };
    let time = match (baseline.time, current.time) {
        (Some(base), Some(cur)) => Some(classify_time(base, cur)),
        _ => None,
    };

    Classification {
        status: ClassificationStatus::Compared,
        bytes: Some(classify_bytes(baseline.bytes, current.bytes)),
        memory,
        time,
    }
}

fn classify_bytes(baseline: i64, current: i64) -> AxisComparison<i64> {
    let verdict = if baseline < 0 || current < 0 {
        Verdict::Corrupt
    } else if current == baseline {
        Verdict::Unchanged
    } else {
        Verdict::from_sign(current, baseline)
    };

    AxisComparison {
        baseline,
        current,
        delta: current.saturating_sub(baseline),
        ratio: (baseline > 0).then(|| current as f64 / baseline as f64),
        verdict,
    }
}

fn classify_pages(baseline_bytes: i64, current_bytes: i64) -> AxisComparison<i64> {
    let baseline = resident_pages(baseline_bytes);
    let current = resident_pages(current_bytes);

    let verdict = if baseline_bytes < 0 || current_bytes < 0 {
        Verdict::Corrupt
    } else if current == baseline {
        Verdict::Unchanged
    } else {
        Verdict::from_sign(current, baseline)
    };

    AxisComparison {
        baseline,
        current,
        delta: current.saturating_sub(baseline),
        ratio: (baseline > 0).then(|| current as f64 / baseline as f64),
        verdict,
    }
}

fn classify_time(baseline: f64, current: f64) -> AxisComparison<f64> {
    let ratio = (baseline > 0.0).then(|| current / baseline);

    let verdict = if baseline < 0.0 || current < 0.0 {
        Verdict::Corrupt
    } else {
        match ratio {
            Some(r) if r > 1.0 + TIME_TOLERANCE || r < 1.0 - TIME_TOLERANCE => {
                Verdict::from_sign(current, baseline)
            }
            _ => Verdict::Unchanged,
        }
    };

    AxisComparison {
        baseline,
        current,
        delta: current - baseline,
        ratio,
        verdict,
    }
}
