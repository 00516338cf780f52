//! Packed file - a single-file container of keyed records
//!
//! Layout (little-endian):
//! `[magic "RSPF"][u32 version][u32 record_count]` followed by
//! `[u32 type][u32 group][u32 instance][u32 byte_len][bytes]` per record.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::persist::record::{AccessMode, PackedRecord, RecordError, RecordKey, RecordSegment};

pub const CONTAINER_MAGIC: [u8; 4] = *b"RSPF";
pub const CONTAINER_VERSION: u32 = 1;

const HEADER_SIZE: usize = 12;
const INDEX_ENTRY_SIZE: usize = 16;

/// Errors raised while opening or writing a packed file
#[derive(Debug, Error)]
pub enum PackedFileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a packed file (bad magic {found:02X?})")]
    BadMagic { path: PathBuf, found: [u8; 4] },
    #[error("{path} has unsupported container version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },
    #[error("{path} is truncated at byte {offset}")]
    Truncated { path: PathBuf, offset: usize },
    #[error("{path} was opened read-only")]
    ReadOnly { path: PathBuf },
}

/// File-backed record segment
///
/// Records are held in memory while the file is open. Committed records are
/// written back by [`PackedFile::close`].
#[derive(Debug)]
pub struct PackedFile {
    path: PathBuf,
    mode: AccessMode,
    records: BTreeMap<RecordKey, Vec<u8>>,
    dirty: bool,
}

impl PackedFile {
    /// Open a container on disk
    ///
    /// Read mode requires the file to exist. Read-write mode starts an empty
    /// container when it does not.
    pub fn open(path: impl Into<PathBuf>, mode: AccessMode) -> Result<Self, PackedFileError> {
        let path = path.into();

        let records = match fs::read(&path) {
            Ok(bytes) => decode(&path, &bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound && mode.is_writable() => {
                BTreeMap::new()
            }
            Err(source) => return Err(PackedFileError::Io { path, source }),
        };

        Ok(Self {
            path,
            mode,
            records,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: RecordKey) -> bool {
        self.records.contains_key(&key)
    }

    /// Raw bytes of a record
    pub fn record_bytes(&self, key: RecordKey) -> Option<&[u8]> {
        self.records.get(&key).map(Vec::as_slice)
    }

    /// True when committed records have not been written to disk yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write committed records to disk and release the container
    pub fn close(mut self) -> Result<(), PackedFileError> {
        self.flush()
    }

    fn flush(&mut self) -> Result<(), PackedFileError> {
        if !self.dirty {
            return Ok(());
        }
        if !self.mode.is_writable() {
            return Err(PackedFileError::ReadOnly {
                path: self.path.clone(),
            });
        }

        let bytes = encode(&self.records);
        write_atomically(&self.path, &bytes).map_err(|source| PackedFileError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            "Wrote {} record(s) to {}",
            self.records.len(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }
}

impl RecordSegment for PackedFile {
    type Record = PackedRecord;

    fn open_record(
        &mut self,
        key: RecordKey,
        mode: AccessMode,
    ) -> Result<Option<PackedRecord>, RecordError> {
        match mode {
            AccessMode::Read => Ok(self
                .records
                .get(&key)
                .map(|bytes| PackedRecord::reader(key, bytes.clone()))),
            AccessMode::ReadWrite if !self.mode.is_writable() => {
                Err(RecordError::ReadOnlySegment { key })
            }
            AccessMode::ReadWrite => Ok(Some(PackedRecord::writer(key))),
        }
    }

    fn close_record(&mut self, record: PackedRecord) -> Result<(), RecordError> {
        // Records opened for reading carry nothing to commit
        if record.mode().is_writable() {
            self.records.insert(record.key(), record.into_bytes());
            self.dirty = true;
        }
        Ok(())
    }

    fn abort_record(&mut self, record: PackedRecord) {
        tracing::debug!("Discarded record {} in {}", record.key(), self.path.display());
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<BTreeMap<RecordKey, Vec<u8>>, PackedFileError> {
    let truncated = |offset: usize| PackedFileError::Truncated {
        path: path.to_path_buf(),
        offset,
    };

    if bytes.len() < HEADER_SIZE {
        return Err(truncated(bytes.len()));
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&bytes[0..4]);
    if magic != CONTAINER_MAGIC {
        return Err(PackedFileError::BadMagic {
            path: path.to_path_buf(),
            found: magic,
        });
    }

    let version = read_u32(bytes, 4);
    if version != CONTAINER_VERSION {
        return Err(PackedFileError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: version,
        });
    }

    let count = read_u32(bytes, 8);
    let mut records = BTreeMap::new();
    let mut offset = HEADER_SIZE;

    for _ in 0..count {
        if bytes.len() - offset < INDEX_ENTRY_SIZE {
            return Err(truncated(offset));
        }
        let key = RecordKey::new(
            read_u32(bytes, offset),
            read_u32(bytes, offset + 4),
            read_u32(bytes, offset + 8),
        );
        let len = read_u32(bytes, offset + 12) as usize;
        offset += INDEX_ENTRY_SIZE;

        if bytes.len() - offset < len {
            return Err(truncated(offset));
        }
        records.insert(key, bytes[offset..offset + len].to_vec());
        offset += len;
    }

    if offset != bytes.len() {
        tracing::warn!(
            "{} has {} trailing byte(s) after its last record",
            path.display(),
            bytes.len() - offset
        );
    }

    Ok(records)
}

fn encode(records: &BTreeMap<RecordKey, Vec<u8>>) -> Vec<u8> {
    let body: usize = records.values().map(|r| INDEX_ENTRY_SIZE + r.len()).sum();
    let mut bytes = Vec::with_capacity(HEADER_SIZE + body);

    bytes.extend_from_slice(&CONTAINER_MAGIC);
    bytes.extend_from_slice(&CONTAINER_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(records.len() as u32).to_le_bytes());

    for (key, data) in records {
        bytes.extend_from_slice(&key.type_id.to_le_bytes());
        bytes.extend_from_slice(&key.group_id.to_le_bytes());
        bytes.extend_from_slice(&key.instance_id.to_le_bytes());
        // PackedRecord refuses to grow past u32::MAX bytes
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(data);
    }

    bytes
}

// Caller guarantees `offset + 4 <= bytes.len()`
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut field = [0u8; 4];
    field.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(field)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&temp, bytes)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}
