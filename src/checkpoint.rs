//! Checkpoint serialization for partition status tables
//!
//! This module provides the durable byte format for
//! [`PartitionStatusTable`](crate::status::PartitionStatusTable) along with
//! atomic file save and load. A checkpoint written after a scan pass is the
//! complete state needed to resume that scan after a restart or on a
//! different client.
//!
//! # Byte Format
//!
//! ```text
//! magic (4 bytes) | version (1 byte) | partition count (u32 LE)
//! then per partition, in partition order:
//! partition id (u16 LE) | flags (1 byte) | cursor (20 bytes, zeroed when absent)
//! ```
//!
//! Flag bit 0 marks the partition done, bit 1 marks the cursor present. A
//! done partition never carries a cursor.
//!
//! # Usage Examples
//!
//! ```rust
//! use partscan::checkpoint;
//! use partscan::status::PartitionStatusTable;
//!
//! let table = PartitionStatusTable::new(8).unwrap();
//! let bytes = table.to_bytes();
//! let restored = PartitionStatusTable::from_bytes(&bytes).unwrap();
//! assert_eq!(table, restored);
//! ```

use crate::error::PartscanError;
use crate::identifiers::{PartitionId, RecordDigest, DIGEST_LENGTH};
use crate::status::{PartitionStatus, PartitionStatusTable, MAX_PARTITIONS};
use crate::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Magic bytes identifying a checkpoint file
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"PSCK";

/// Current version of the checkpoint format
pub const CHECKPOINT_VERSION: u8 = 1;

/// Size of the fixed checkpoint header in bytes
const HEADER_SIZE: usize = 9;

/// Size of one partition entry in bytes
const ENTRY_SIZE: usize = 2 + 1 + DIGEST_LENGTH;

/// Flag bit: partition fully scanned
const FLAG_DONE: u8 = 0b0000_0001;

/// Flag bit: cursor bytes are meaningful
const FLAG_HAS_CURSOR: u8 = 0b0000_0010;

impl PartitionStatusTable {
    /// Serialize this table to the checkpoint byte format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.partition_count() * ENTRY_SIZE);
        bytes.extend_from_slice(&CHECKPOINT_MAGIC);
        bytes.push(CHECKPOINT_VERSION);
        bytes.extend_from_slice(&(self.partition_count() as u32).to_le_bytes());

        for status in self.entries() {
            bytes.extend_from_slice(&status.partition_id().raw().to_le_bytes());
            let mut flags = 0u8;
            if status.is_done() {
                flags |= FLAG_DONE;
            }
            if status.cursor().is_some() {
                flags |= FLAG_HAS_CURSOR;
            }
            bytes.push(flags);
            match status.cursor() {
                Some(cursor) => bytes.extend_from_slice(cursor.as_bytes()),
                None => bytes.extend_from_slice(&[0u8; DIGEST_LENGTH]),
            }
        }

        bytes
    }

    /// Deserialize a table from the checkpoint byte format
    ///
    /// Every structural property is validated: magic, version, entry count,
    /// exact length, dense partition ordering, and flag consistency. Any
    /// violation yields a [`PartscanError::Corruption`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(PartscanError::corruption(format!(
                "checkpoint truncated: {} bytes is smaller than the {} byte header",
                bytes.len(),
                HEADER_SIZE
            )));
        }
        if bytes[0..4] != CHECKPOINT_MAGIC {
            return Err(PartscanError::corruption(
                "checkpoint magic bytes do not match",
            ));
        }
        let version = bytes[4];
        if version != CHECKPOINT_VERSION {
            return Err(PartscanError::config(format!(
                "unsupported checkpoint version: found {}, maximum supported {}",
                version, CHECKPOINT_VERSION
            )));
        }

        let count_bytes: [u8; 4] = bytes[5..9]
            .try_into()
            .map_err(|_| PartscanError::corruption("checkpoint header unreadable"))?;
        let count = u32::from_le_bytes(count_bytes) as usize;
        if count == 0 {
            return Err(PartscanError::corruption(
                "checkpoint declares zero partitions",
            ));
        }
        if count > MAX_PARTITIONS {
            return Err(PartscanError::corruption(format!(
                "checkpoint declares {} partitions, maximum is {}",
                count, MAX_PARTITIONS
            )));
        }

        let expected_len = HEADER_SIZE + count * ENTRY_SIZE;
        if bytes.len() != expected_len {
            return Err(PartscanError::corruption(format!(
                "checkpoint length mismatch: expected {} bytes for {} partitions, got {}",
                expected_len,
                count,
                bytes.len()
            )));
        }

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let offset = HEADER_SIZE + index * ENTRY_SIZE;
            let entry = &bytes[offset..offset + ENTRY_SIZE];

            let partition_id = u16::from_le_bytes([entry[0], entry[1]]);
            if partition_id as usize != index {
                return Err(PartscanError::corruption(format!(
                    "checkpoint entry {} names partition {}, expected dense ordering",
                    index, partition_id
                )));
            }

            let flags = entry[2];
            if flags & !(FLAG_DONE | FLAG_HAS_CURSOR) != 0 {
                return Err(PartscanError::corruption(format!(
                    "checkpoint entry {} carries unknown flag bits {:#04x}",
                    index, flags
                )));
            }
            let done = flags & FLAG_DONE != 0;
            let has_cursor = flags & FLAG_HAS_CURSOR != 0;
            if done && has_cursor {
                return Err(PartscanError::corruption(format!(
                    "checkpoint entry {} marks a finished partition with a cursor",
                    index
                )));
            }

            let mut cursor_bytes = [0u8; DIGEST_LENGTH];
            cursor_bytes.copy_from_slice(&entry[3..3 + DIGEST_LENGTH]);
            let cursor = if has_cursor {
                Some(RecordDigest::from_bytes(cursor_bytes))
            } else {
                if cursor_bytes != [0u8; DIGEST_LENGTH] {
                    return Err(PartscanError::corruption(format!(
                        "checkpoint entry {} carries stray cursor bytes",
                        index
                    )));
                }
                None
            };

            entries.push(PartitionStatus::from_parts(
                PartitionId::new(partition_id),
                done,
                cursor,
            ));
        }

        Ok(Self::from_entries(entries))
    }
}

/// Save a table to `path` atomically
///
/// The checkpoint is written to a temporary file next to `path` and moved
/// into place with a rename, so a crash mid-write never leaves a partial
/// checkpoint behind.
pub fn save_table(table: &PartitionStatusTable, path: &Path) -> Result<()> {
    let bytes = table.to_bytes();

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &bytes).map_err(|e| {
        PartscanError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write checkpoint to {}: {}", temp_path.display(), e),
        ))
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PartscanError::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to move checkpoint from {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ),
        ))
    })?;

    debug!(
        "Saved checkpoint for {} partitions ({} pending) to {}",
        table.partition_count(),
        table.pending_count(),
        path.display()
    );
    Ok(())
}

/// Load a table from a checkpoint file at `path`
pub fn load_table(path: &Path) -> Result<PartitionStatusTable> {
    let bytes = fs::read(path).map_err(|e| {
        PartscanError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read checkpoint file {}: {}", path.display(), e),
        ))
    })?;

    let table = PartitionStatusTable::from_bytes(&bytes)?;
    debug!(
        "Loaded checkpoint for {} partitions ({} pending) from {}",
        table.partition_count(),
        table.pending_count(),
        path.display()
    );
    Ok(table)
}
