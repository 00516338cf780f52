//! Persistence layer - record segments and the packed file container

pub mod packed_file;
pub mod record;
pub mod region;

pub use packed_file::{PackedFile, PackedFileError};
pub use record::{AccessMode, PackedRecord, RecordError, RecordKey, RecordSegment, SerialRecord};
pub use region::{load_region_ledger, save_region_ledger, SaveOutcome};
