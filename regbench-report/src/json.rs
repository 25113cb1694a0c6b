//! JSON Output

use crate::aggregate::SuiteReport;
use crate::report::{CollectionReport, FootprintCollection};

/// Generate a prettified JSON suite report
pub fn generate_json_report(report: &SuiteReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Serialize a collection for the reporting phase
pub fn generate_collection_json(collection: &CollectionReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(collection)
}

/// Read a collection written by [`generate_collection_json`]
pub fn parse_collection_json(text: &str) -> Result<CollectionReport, serde_json::Error> {
    serde_json::from_str(text)
}

/// Serialize a footprint collection
pub fn generate_footprint_json(collection: &FootprintCollection) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(collection)
}

/// Read a footprint collection written by [`generate_footprint_json`]
pub fn parse_footprint_json(text: &str) -> Result<FootprintCollection, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Accumulator;
    use crate::report::{CollectionMeta, GroupResults, TestEntry, TestResult};
    use chrono::{TimeZone, Utc};
    use regbench_stats::{Snapshot, classify};

    #[test]
    fn collection_survives_the_phase_split() {
        let collection = CollectionReport {
            meta: Some(CollectionMeta {
                version: "0.1.0".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                trials: 2,
                runtime: "dist/mu-sys".to_string(),
                git_commit: None,
            }),
            ns: "core".to_string(),
            results: vec![GroupResults {
                group: "lists".to_string(),
                results: vec![TestEntry::Measured(TestResult {
                    line: 1,
                    storage: Some("heap".to_string()),
                    times: vec![Some("0.5".to_string()), None],
                    mem_virt: Some("4096".to_string()),
                })],
            }],
        };

        let json = generate_collection_json(&collection).unwrap();
        assert_eq!(parse_collection_json(&json).unwrap(), collection);
    }

    #[test]
    fn suite_report_carries_markers_and_totals() {
        let mut acc = Accumulator::new(false);
        acc.accumulate(
            "core/lists",
            classify(&Snapshot::new(1000, 2.0, 8192), &Snapshot::new(1200, 2.0, 8192)),
        );

        let json = generate_json_report(&acc.finalize()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["lines"][0]["marker"], "+  ");
        assert_eq!(value["lines"][0]["classification"]["bytes"]["verdict"], "increased");
        assert_eq!(value["totals"]["delta_bytes"], 200);
    }
}
