pub mod field_family;
pub mod record;
pub mod sample;
pub mod scheme;

pub use field_family::FieldFamily;
pub use record::{AttemptResult, BestSoFar, DebugInfo, ExtractionRecord, ProbeReport};
pub use sample::{DomSnapshot, PageStructuralSample, StructureEntry};
pub use scheme::{RawScheme, SelectorScheme};
