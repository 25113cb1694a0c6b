#![warn(missing_docs)]
//! Regbench Core - Test Identity and Runtime Protocol
//!
//! This crate describes everything regbench knows about the external runtime:
//! - `Namespace` - the closed set of suite partitions and their preload chains
//! - `InvocationBuilder` - argument vectors for measured and plain evaluations
//! - `TestCase` / `Suite` - suite definitions loaded from the `tests` index
//! - Record decoding for the runtime's textual metric encodings

mod invocation;
mod namespace;
mod record;
mod suite;

pub use invocation::{
    FOOTPRINT_FORMAT, InvocationBuilder, InvocationSpec, MeasurementKind, RuntimeLayout,
};
pub use namespace::{Namespace, NamespaceError};
pub use record::{
    FootprintRecord, GenerationUsage, HEAP_RECORD_V1, HeapRecordSchema, PAGE_SIZE, ResidentMemory,
    StorageMeasurement, parse_footprint, parse_resident, parse_storage, parse_storage_with, parse_time,
    resident_pages,
};
pub use suite::{Suite, SuiteEntry, SuiteError, SuiteGroup, TestCase, load_suite, parse_group};

/// Name of the per-namespace index file listing group files
pub const SUITE_INDEX: &str = "tests";
