#![warn(missing_docs)]
//! Regbench Statistical Engine
//!
//! Provides the two numeric stages of the pipeline:
//! - Trial aggregation: repeated timing trials folded into one summary
//! - Baseline classification: per-axis verdicts for bytes, pages and time
//! - Footprint summary: means over repeated runtime startups

mod comparison;
mod footprint;
mod summary;

pub use comparison::{
    AxisComparison, Classification, ClassificationStatus, Snapshot, Verdict, classify,
};
pub use footprint::{FootprintSummary, summarize_footprint};
pub use summary::{TrialSummary, compute_median, summarize_trials};

/// Relative time change treated as measurement noise (±15%)
pub const TIME_TOLERANCE: f64 = 0.15;
