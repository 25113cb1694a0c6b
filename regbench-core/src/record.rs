//! Metric Record Decoding
//!
//! The runtime prints its measurements as plain text. Decoders here turn
//! that text into numbers and return `None` for anything malformed; callers
//! treat `None` as "cannot compare", never as zero.
//!
//! Heap records are positional, so the layout is pinned by a versioned
//! schema: a change in the runtime's output must come with a new schema
//! rather than silently shifting which fields are summed.

use serde::{Deserialize, Serialize};

/// Bytes per resident-memory page
pub const PAGE_SIZE: i64 = 4096;

/// Fixed layout of a heap-usage record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRecordSchema {
    /// Schema version stamped on decoded measurements
    pub version: u32,
    /// Exact number of whitespace-delimited fields
    pub field_count: usize,
    /// Number of generation blocks
    pub blocks: usize,
    /// Fields per generation block: generation, free, used, count
    pub block_width: usize,
}

impl HeapRecordSchema {
    /// Whether every block fits in the record and carries the four
    /// generation, free, used and count fields
    pub fn is_valid(&self) -> bool {
        self.blocks > 0
            && self.block_width >= 4
            && self
                .blocks
                .checked_mul(self.block_width)
                .is_some_and(|width| width <= self.field_count)
    }
}

/// Six generation blocks of four fields plus a trailing field
pub const HEAP_RECORD_V1: HeapRecordSchema = HeapRecordSchema {
    version: 1,
    field_count: 25,
    blocks: 6,
    block_width: 4,
};

/// Usage of one heap generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUsage {
    /// Generation or pool name as printed
    pub generation: String,
    /// Free bytes, when printed as a number
    pub free: Option<i64>,
    /// Bytes in use
    pub used: i64,
    /// Object count, when printed as a number
    pub count: Option<i64>,
}

/// Decoded storage-delta measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMeasurement {
    /// Schema the record was decoded with
    pub schema_version: u32,
    /// Per-generation usage
    pub generations: Vec<GenerationUsage>,
}

impl StorageMeasurement {
    /// Sum of used bytes across all generations
    pub fn total_bytes(&self) -> i64 {
        self.generations
            .iter()
            .fold(0i64, |total, g| total.saturating_add(g.used))
    }
}

/// Decoded resident-memory measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentMemory {
    /// Resident bytes
    pub bytes: i64,
}

impl ResidentMemory {
    /// Resident bytes rounded up to whole pages
    pub fn pages(&self) -> i64 {
        resident_pages(self.bytes)
    }
}

/// `ceil(bytes / 4096)`; negative inputs are error markers and map to -1
pub fn resident_pages(bytes: i64) -> i64 {
    if bytes < 0 {
        -1
    } else {
        bytes / PAGE_SIZE + i64::from(bytes % PAGE_SIZE != 0)
    }
}

/// Decode a heap record with the current schema
pub fn parse_storage(text: &str) -> Option<StorageMeasurement> {
    parse_storage_with(&HEAP_RECORD_V1, text)
}

/// Decode a heap record with an explicit schema
pub fn parse_storage_with(schema: &HeapRecordSchema, text: &str) -> Option<StorageMeasurement> {
    if !schema.is_valid() {
        tracing::warn!("heap record schema v{} is inconsistent: {:?}", schema.version, schema);
        return None;
    }

    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != schema.field_count {
        tracing::debug!(
            "heap record has {} fields, schema v{} expects {}",
            fields.len(),
            schema.version,
            schema.field_count
        );
        return None;
    }

    let generations = fields
        .chunks_exact(schema.block_width)
        .take(schema.blocks)
        .map(|block| {
            Some(GenerationUsage {
                generation: block[0].to_string(),
                free: block[1].parse().ok(),
                used: block[2].parse().ok()?,
                count: block[3].parse().ok(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(StorageMeasurement {
        schema_version: schema.version,
        generations,
    })
}

/// Decode one trial's elapsed time
pub fn parse_time(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|t| t.is_finite())
}

/// Decode a resident-memory byte count
pub fn parse_resident(text: &str) -> Option<ResidentMemory> {
    text.trim()
        .parse::<i64>()
        .ok()
        .map(|bytes| ResidentMemory { bytes })
}

/// One GNU time report of a runtime startup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintRecord {
    /// System CPU seconds
    pub system: f64,
    /// User CPU seconds
    pub user: f64,
    /// Elapsed wall-clock seconds
    pub elapsed: f64,
    /// Maximum resident set, KiB
    pub resident_kb: i64,
    /// Voluntary context switches
    pub waits: i64,
    /// System page size in bytes
    pub page_size: i64,
}

/// Decode the time report of a startup run.
///
/// The report is the last non-blank line of the text, six fields, possibly
/// wrapped in quotes when the format was passed quoted.
pub fn parse_footprint(text: &str) -> Option<FootprintRecord> {
    let line = text.lines().rev().find(|l| !l.trim().is_empty())?;
    let fields: Vec<&str> = line.trim().trim_matches('"').split_whitespace().collect();
    let [system, user, elapsed, resident, waits, page_size] = fields.as_slice() else {
        return None;
    };

    Some(FootprintRecord {
        system: parse_time(system)?,
        user: parse_time(user)?,
        elapsed: parse_time(elapsed)?,
        resident_kb: resident.parse().ok()?,
        waits: waits.parse().ok()?,
        page_size: page_size.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_record(used: [i64; 6]) -> String {
        let mut fields = Vec::new();
        for (i, u) in used.iter().enumerate() {
            fields.push(format!("gen{}", i));
            fields.push("4096".to_string());
            fields.push(u.to_string());
            fields.push("7".to_string());
        }
        fields.push(":end".to_string());
        fields.join(" ")
    }

    #[test]
    fn sums_used_fields_at_fixed_stride() {
        let record = parse_storage(&heap_record([100, 200, 300, 50, 0, 0])).unwrap();

        assert_eq!(record.schema_version, 1);
        assert_eq!(record.generations.len(), 6);
        assert_eq!(record.total_bytes(), 650);
        assert_eq!(record.generations[1].generation, "gen1");
        assert_eq!(record.generations[1].free, Some(4096));
        assert_eq!(record.generations[1].count, Some(7));
    }

    #[test]
    fn only_offsets_two_mod_four_contribute() {
        let fields: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let record = parse_storage(&fields.join(" ")).unwrap();
        assert_eq!(record.total_bytes(), 2 + 6 + 10 + 14 + 18 + 22);
    }

    #[test]
    fn wrong_field_count_is_absent() {
        assert!(parse_storage("").is_none());
        assert!(parse_storage("1 2 3").is_none());

        let mut long = heap_record([1, 1, 1, 1, 1, 1]);
        long.push_str(" extra");
        assert!(parse_storage(&long).is_none());
    }

    #[test]
    fn non_numeric_used_field_is_absent() {
        let record = heap_record([1, 2, 3, 4, 5, 6]).replacen(" 3 ", " x ", 1);
        assert!(parse_storage(&record).is_none());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let record = format!("  {}\n", heap_record([10, 0, 0, 0, 0, 0]));
        assert_eq!(parse_storage(&record).unwrap().total_bytes(), 10);
    }

    #[test]
    fn parses_time_seconds() {
        assert_eq!(parse_time("2.5"), Some(2.5));
        assert_eq!(parse_time(" 120\n"), Some(120.0));
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("fast"), None);
        assert_eq!(parse_time("NaN"), None);
    }

    #[test]
    fn rounds_resident_bytes_up_to_pages() {
        assert_eq!(parse_resident("0").unwrap().pages(), 0);
        assert_eq!(parse_resident("1").unwrap().pages(), 1);
        assert_eq!(parse_resident("4096").unwrap().pages(), 1);
        assert_eq!(parse_resident("4097").unwrap().pages(), 2);
        assert_eq!(parse_resident("8192").unwrap().pages(), 2);
        assert!(parse_resident("").is_none());
        assert!(parse_resident("12.5").is_none());
    }

    #[test]
    fn negative_bytes_keep_error_marker() {
        assert_eq!(resident_pages(-1), -1);
    }

    #[test]
    fn huge_resident_bytes_do_not_overflow() {
        assert_eq!(resident_pages(i64::MAX), i64::MAX / PAGE_SIZE + 1);
    }

    #[test]
    fn current_schema_is_valid() {
        assert!(HEAP_RECORD_V1.is_valid());
    }

    #[test]
    fn inconsistent_schemas_decode_nothing() {
        let record = heap_record([1, 2, 3, 4, 5, 6]);
        let narrow = HeapRecordSchema {
            block_width: 3,
            ..HEAP_RECORD_V1
        };
        let empty = HeapRecordSchema {
            block_width: 0,
            ..HEAP_RECORD_V1
        };
        let overlong = HeapRecordSchema {
            blocks: 7,
            ..HEAP_RECORD_V1
        };

        for schema in [narrow, empty, overlong] {
            assert!(!schema.is_valid());
            assert!(parse_storage_with(&schema, &record).is_none());
        }
    }

    #[test]
    fn decodes_time_report() {
        let record = parse_footprint("0.01 0.03 0.05 14336 2 4096\n").unwrap();
        assert_eq!(record.system, 0.01);
        assert_eq!(record.user, 0.03);
        assert_eq!(record.elapsed, 0.05);
        assert_eq!(record.resident_kb, 14336);
        assert_eq!(record.waits, 2);
        assert_eq!(record.page_size, 4096);
    }

    #[test]
    fn time_report_is_the_last_line() {
        let text = "warning: slow start\n\"0.00 0.01 0.02 9000 0 4096\"\n\n";
        assert_eq!(parse_footprint(text).unwrap().resident_kb, 9000);
    }

    #[test]
    fn malformed_time_report_is_absent() {
        assert!(parse_footprint("").is_none());
        assert!(parse_footprint("0.01 0.03 0.05 14336 2").is_none());
        assert!(parse_footprint("Command exited with non-zero status 1").is_none());
        assert!(parse_footprint("0.01 0.03 0.05 big 2 4096").is_none());
    }
}
