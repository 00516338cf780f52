//! Typed, sequential records and the segments that hold them
//!
//! A record is read or written one field at a time, in order. Segments hand
//! out records for a single load or save and take them back either through
//! [`RecordSegment::close_record`] (commit) or [`RecordSegment::abort_record`]
//! (discard).

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors raised by record field access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record {key} ended at byte {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEnd {
        key: RecordKey,
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("record {key} was opened read-only")]
    NotWritable { key: RecordKey },
    #[error("record {key} was opened for writing")]
    NotReadable { key: RecordKey },
    #[error("segment is read-only, cannot open {key} for writing")]
    ReadOnlySegment { key: RecordKey },
    #[error("record {key} exceeds the container size limit")]
    TooLarge { key: RecordKey },
}

/// How a record or segment is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

impl AccessMode {
    pub fn is_writable(&self) -> bool {
        matches!(self, AccessMode::ReadWrite)
    }
}

/// Type/group/instance key of a record inside a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct RecordKey {
    pub type_id: u32,
    pub group_id: u32,
    pub instance_id: u32,
}

impl RecordKey {
    /// Key the regional supply ledger is stored under
    pub const REGIONAL_SUPPLY: RecordKey = RecordKey::new(0xA82A8BEC, 0x655AEDB3, 1);

    pub const fn new(type_id: u32, group_id: u32, instance_id: u32) -> Self {
        Self {
            type_id,
            group_id,
            instance_id,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:08X}/0x{:08X}/0x{:08X}",
            self.type_id, self.group_id, self.instance_id
        )
    }
}

/// Sequential typed field access
pub trait SerialRecord {
    fn get_u32(&mut self) -> Result<u32, RecordError>;
    fn get_i64(&mut self) -> Result<i64, RecordError>;
    fn set_u32(&mut self, value: u32) -> Result<(), RecordError>;
    fn set_i64(&mut self, value: i64) -> Result<(), RecordError>;
}

/// A container of keyed records with explicit commit/abort
pub trait RecordSegment {
    type Record: SerialRecord;

    /// Open a record. Reading a key that does not exist yields `None`;
    /// opening for write always starts an empty record.
    fn open_record(
        &mut self,
        key: RecordKey,
        mode: AccessMode,
    ) -> Result<Option<Self::Record>, RecordError>;

    /// Commit a record, replacing any previous data under its key
    fn close_record(&mut self, record: Self::Record) -> Result<(), RecordError>;

    /// Discard a record, leaving the segment's previous data untouched
    fn abort_record(&mut self, record: Self::Record);
}

/// In-memory record with a read/write cursor
///
/// Fields are little-endian and packed back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRecord {
    key: RecordKey,
    mode: AccessMode,
    data: Vec<u8>,
    cursor: usize,
}

impl PackedRecord {
    /// A record to read back previously written bytes
    pub fn reader(key: RecordKey, data: Vec<u8>) -> Self {
        Self {
            key,
            mode: AccessMode::Read,
            data,
            cursor: 0,
        }
    }

    /// An empty record to write into
    pub fn writer(key: RecordKey) -> Self {
        Self {
            key,
            mode: AccessMode::ReadWrite,
            data: Vec::new(),
            cursor: 0,
        }
    }

    pub fn key(&self) -> RecordKey {
        self.key
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Bytes not yet consumed by reads
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], RecordError> {
        if self.mode.is_writable() {
            return Err(RecordError::NotReadable { key: self.key });
        }
        let remaining = self.remaining();
        if remaining < N {
            return Err(RecordError::UnexpectedEnd {
                key: self.key,
                offset: self.cursor,
                needed: N,
                remaining,
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.cursor..self.cursor + N]);
        self.cursor += N;
        Ok(bytes)
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), RecordError> {
        if !self.mode.is_writable() {
            return Err(RecordError::NotWritable { key: self.key });
        }
        if self.data.len() + bytes.len() > u32::MAX as usize {
            return Err(RecordError::TooLarge { key: self.key });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

impl SerialRecord for PackedRecord {
    fn get_u32(&mut self) -> Result<u32, RecordError> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    fn get_i64(&mut self) -> Result<i64, RecordError> {
        self.take::<8>().map(i64::from_le_bytes)
    }

    fn set_u32(&mut self, value: u32) -> Result<(), RecordError> {
        self.put(&value.to_le_bytes())
    }

    fn set_i64(&mut self, value: i64) -> Result<(), RecordError> {
        self.put(&value.to_le_bytes())
    }
}
