//! Region-level load/save of the ledger record

use crate::persist::record::{AccessMode, RecordKey, RecordSegment};
use crate::supply::ledger::Ledger;
use crate::supply::serializer::{self, PersistError};

/// What [`save_region_ledger`] did with the segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The ledger was written and the record committed
    Committed,
    /// Nothing to write, the segment was not touched
    Skipped,
}

/// Read the region ledger from `segment`
///
/// A missing record gives an empty ledger. A record that fails to load is
/// logged and also gives an empty ledger; partial data is never kept.
pub fn load_region_ledger<S: RecordSegment>(segment: &mut S, key: RecordKey) -> Ledger {
    let mut ledger = Ledger::new();

    let mut record = match segment.open_record(key, AccessMode::Read) {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!("No regional supply record {}, starting empty", key);
            return ledger;
        }
        Err(e) => {
            tracing::error!("Failed to open the region resource data: {}", e);
            return ledger;
        }
    };

    if let Err(e) = serializer::load_from(&mut ledger, &mut record) {
        tracing::error!("Failed to load the region resource data. {}", e);
        ledger.clear();
    }

    if let Err(e) = segment.close_record(record) {
        tracing::error!("Failed to close the region resource record: {}", e);
    }

    ledger
}

/// Write the region ledger to `segment`
///
/// An empty ledger is not written. A failed write aborts the record so the
/// previously committed data stays as it was.
pub fn save_region_ledger<S: RecordSegment>(
    ledger: &Ledger,
    segment: &mut S,
    key: RecordKey,
) -> Result<SaveOutcome, PersistError> {
    if ledger.is_empty() {
        return Ok(SaveOutcome::Skipped);
    }

    let Some(mut record) = segment.open_record(key, AccessMode::ReadWrite)? else {
        return Ok(SaveOutcome::Skipped);
    };

    match serializer::save_to(ledger, &mut record) {
        Ok(()) => {
            segment.close_record(record)?;
            Ok(SaveOutcome::Committed)
        }
        Err(e) => {
            tracing::error!("Failed to save the region resource data. {}", e);
            segment.abort_record(record);
            Err(e)
        }
    }
}
