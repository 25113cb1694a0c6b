//! Collection Metadata
//!
//! Describes how a collection file was produced: regbench version, start
//! time, trial count, runtime binary and, inside a git checkout, the current
//! commit.

use chrono::Utc;
use regbench_core::RuntimeLayout;
use regbench_report::CollectionMeta;

/// Build metadata for a collection run
pub fn build_collection_meta(trials: usize, layout: &RuntimeLayout) -> CollectionMeta {
    CollectionMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        trials,
        runtime: layout.binary.display().to_string(),
        git_commit: git_commit(),
    }
}

fn git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
