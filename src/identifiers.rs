//! Typed identifiers for records and partitions
//!
//! This module provides strongly-typed identifiers used throughout the crate,
//! preventing accidental misuse of raw byte arrays or integers across API
//! boundaries.
//!
//! # Key Components
//!
//! - [`RecordDigest`]: 20-byte content digest uniquely identifying a record
//! - [`PartitionId`]: index of a partition within a namespace
//!
//! # Usage Examples
//!
//! ```rust
//! use partscan::identifiers::{PartitionId, RecordDigest};
//!
//! let digest = RecordDigest::from_bytes([0xab; 20]);
//! let partition = digest.partition_id(4096);
//! assert!(partition.index() < 4096);
//!
//! // Digests render as lowercase hex and parse back
//! let text = digest.to_string();
//! let parsed: RecordDigest = text.parse().unwrap();
//! assert_eq!(digest, parsed);
//! ```

use crate::error::PartscanError;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Length in bytes of a record digest
pub const DIGEST_LENGTH: usize = 20;

/// Opaque 20-byte digest identifying a single record
///
/// Digests are assigned by the store from the record's set and primary key.
/// They order records within a partition and serve as resume cursors, so the
/// byte representation is stable and comparable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(transparent)]
pub struct RecordDigest([u8; DIGEST_LENGTH]);

// SAFETY: RecordDigest is a transparent wrapper around [u8; 20], which is Pod
unsafe impl Pod for RecordDigest {}
// SAFETY: RecordDigest can be zero-initialized safely
unsafe impl Zeroable for RecordDigest {}

impl RecordDigest {
    /// Create a digest from raw bytes
    pub fn from_bytes(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Convert to raw bytes
    pub fn to_bytes(self) -> [u8; DIGEST_LENGTH] {
        self.0
    }

    /// Borrow the digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Whether this digest is the all-zero value
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_LENGTH]
    }

    /// Derive the owning partition for a namespace with `partition_count` partitions
    ///
    /// The partition index is taken from the first two digest bytes, so every
    /// client derives the same mapping for the same record.
    pub fn partition_id(&self, partition_count: usize) -> PartitionId {
        let prefix = u16::from_le_bytes([self.0[0], self.0[1]]);
        PartitionId::new((prefix as usize % partition_count) as u16)
    }
}

impl Display for RecordDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for RecordDigest {
    type Err = PartscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_LENGTH * 2 {
            return Err(PartscanError::invalid_digest(format!(
                "expected {} hex characters, got {}",
                DIGEST_LENGTH * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; DIGEST_LENGTH];
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| PartscanError::invalid_digest("non-ASCII character"))?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| {
                PartscanError::invalid_digest(format!("invalid hex pair '{}'", pair))
            })?;
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; DIGEST_LENGTH]> for RecordDigest {
    fn from(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<RecordDigest> for [u8; DIGEST_LENGTH] {
    fn from(digest: RecordDigest) -> Self {
        digest.0
    }
}

/// Index of a partition within a namespace
///
/// Partitions are numbered densely from zero, so a namespace with `N`
/// partitions uses ids `0..N`. The u16 width bounds a namespace at 65536
/// partitions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(transparent)]
pub struct PartitionId(u16);

// SAFETY: PartitionId is a transparent wrapper around u16, which is Pod
unsafe impl Pod for PartitionId {}
// SAFETY: PartitionId can be zero-initialized safely
unsafe impl Zeroable for PartitionId {}

impl PartitionId {
    /// Create a partition id from a raw index
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index value
    pub fn raw(self) -> u16 {
        self.0
    }

    /// The index as a usize, suitable for slice access
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for PartitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for PartitionId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl From<PartitionId> for u16 {
    fn from(id: PartitionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_byte_roundtrip() {
        let bytes = [0x5au8; DIGEST_LENGTH];
        let digest = RecordDigest::from_bytes(bytes);
        assert_eq!(digest.to_bytes(), bytes);
        assert_eq!(digest.as_bytes(), &bytes);
    }

    #[test]
    fn test_digest_display_is_lowercase_hex() {
        let mut bytes = [0u8; DIGEST_LENGTH];
        bytes[0] = 0xde;
        bytes[1] = 0xad;
        bytes[19] = 0x0f;
        let digest = RecordDigest::from_bytes(bytes);
        let text = digest.to_string();
        assert_eq!(text.len(), 40);
        assert!(text.starts_with("dead"));
        assert!(text.ends_with("0f"));
    }

    #[test]
    fn test_digest_parse_roundtrip() {
        let digest = RecordDigest::from_bytes([0xc3; DIGEST_LENGTH]);
        let parsed: RecordDigest = digest.to_string().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn test_digest_parse_rejects_wrong_length() {
        let result = "abcd".parse::<RecordDigest>();
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("40 hex characters"));
    }

    #[test]
    fn test_digest_parse_rejects_non_hex() {
        let text = "zz".repeat(DIGEST_LENGTH);
        assert!(text.parse::<RecordDigest>().is_err());
    }

    #[test]
    fn test_zero_digest_detection() {
        assert!(RecordDigest::default().is_zero());
        assert!(!RecordDigest::from_bytes([1u8; DIGEST_LENGTH]).is_zero());
    }

    #[test]
    fn test_partition_assignment_is_stable() {
        let digest = RecordDigest::from_bytes([0x17; DIGEST_LENGTH]);
        let first = digest.partition_id(4096);
        let second = digest.partition_id(4096);
        assert_eq!(first, second);
    }

    #[test]
    fn test_partition_assignment_respects_count() {
        for seed in 0..32u8 {
            let digest = RecordDigest::from_bytes([seed; DIGEST_LENGTH]);
            assert!(digest.partition_id(7).index() < 7);
            assert_eq!(digest.partition_id(1).index(), 0);
        }
    }

    #[test]
    fn test_partition_id_accessors() {
        let id = PartitionId::new(513);
        assert_eq!(id.raw(), 513);
        assert_eq!(id.index(), 513);
        assert_eq!(id.to_string(), "513");
        assert_eq!(u16::from(id), 513);
        assert_eq!(PartitionId::from(513u16), id);
    }

    #[test]
    fn test_identifier_memory_layout() {
        assert_eq!(std::mem::size_of::<RecordDigest>(), DIGEST_LENGTH);
        assert_eq!(std::mem::size_of::<PartitionId>(), 2);
    }

    #[test]
    fn test_digest_ordering_matches_bytes() {
        let low = RecordDigest::from_bytes([0x01; DIGEST_LENGTH]);
        let high = RecordDigest::from_bytes([0x02; DIGEST_LENGTH]);
        assert!(low < high);
    }

    #[test]
    fn test_serde_roundtrip() {
        let digest = RecordDigest::from_bytes([0x44; DIGEST_LENGTH]);
        let json = serde_json::to_string(&digest).unwrap();
        let back: RecordDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);

        let id = PartitionId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        let back: PartitionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
