//! Trial Summary
//!
//! Folds the per-trial timing samples of one test into a summary.
//! Failed trials arrive as `None` and are counted, never averaged in.

use serde::{Deserialize, Serialize};

/// Summary of repeated timing trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Mean of successful trials
    pub mean: f64,
    /// Median of successful trials
    pub median: f64,
    /// Sample standard deviation (0 with fewer than two successes)
    pub std_dev: f64,
    /// Fastest successful trial
    pub min: f64,
    /// Slowest successful trial
    pub max: f64,
    /// Trials that produced a value
    pub successes: usize,
    /// Trials that failed
    pub failures: usize,
}

/// Summarize trials, or `None` when no trial succeeded
pub fn summarize_trials(samples: &[Option<f64>]) -> Option<TrialSummary> {
    let values: Vec<f64> = samples.iter().flatten().copied().collect();
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(TrialSummary {
        mean,
        median: compute_median(&values),
        std_dev,
        min,
        max,
        successes: values.len(),
        failures: samples.len() - values.len(),
    })
}

/// Median with linear interpolation between the two middle values
pub fn compute_median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
