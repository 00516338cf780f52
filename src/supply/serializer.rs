//! Versioned binary form of the ledger
//!
//! Layout: `[u32 version = 1][u32 count][(u32 id, i64 quantity) x count]`.

use thiserror::Error;

use crate::core::types::ResourceId;
use crate::persist::record::{RecordError, SerialRecord};
use crate::supply::ledger::Ledger;

/// Only version of the ledger record written so far
pub const LEDGER_FORMAT_VERSION: u32 = 1;

/// Errors raised while moving a ledger in or out of a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("unsupported ledger format version {found}, expected {}", LEDGER_FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("ledger has {0} entries, more than the format can count")]
    TooManyEntries(usize),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Replace the ledger's contents with the entries stored in `record`
///
/// When an id appears more than once, its first quantity is kept.
///
/// Not atomic: entries read before a failing field stay in the ledger, so a
/// caller must discard the whole ledger whenever this returns an error.
pub fn load_from<R>(ledger: &mut Ledger, record: &mut R) -> Result<(), PersistError>
where
    R: SerialRecord + ?Sized,
{
    ledger.clear();

    let version = record.get_u32()?;
    if version != LEDGER_FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion { found: version });
    }

    let count = record.get_u32()?;
    for _ in 0..count {
        let id = ResourceId(record.get_u32()?);
        let quantity = record.get_i64()?;
        ledger.insert_balance(id, quantity);
    }

    Ok(())
}

/// Write every ledger entry to `record`, in iteration order
///
/// Stops at the first failing field; the caller aborts the record.
pub fn save_to<R>(ledger: &Ledger, record: &mut R) -> Result<(), PersistError>
where
    R: SerialRecord + ?Sized,
{
    let count =
        u32::try_from(ledger.len()).map_err(|_| PersistError::TooManyEntries(ledger.len()))?;

    record.set_u32(LEDGER_FORMAT_VERSION)?;
    record.set_u32(count)?;

    for (id, quantity) in ledger.iter() {
        record.set_u32(id.value())?;
        record.set_i64(quantity)?;
    }

    Ok(())
}
