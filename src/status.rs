//! Partition status tracking for resumable scans
//!
//! This module provides the partition status table: one entry per partition
//! recording whether the partition has been fully scanned and, if not, the
//! digest of the last record delivered from it. A table produced by one scan
//! pass is the complete input needed to resume the scan later, on this client
//! or another.
//!
//! # Key Components
//!
//! - [`PartitionStatus`]: per-partition done flag and resume cursor
//! - [`PartitionStatusTable`]: dense table covering every partition of a namespace
//!
//! # Usage Examples
//!
//! ```rust
//! use partscan::status::PartitionStatusTable;
//!
//! let table = PartitionStatusTable::new(4096).unwrap();
//! assert_eq!(table.partition_count(), 4096);
//! assert_eq!(table.pending_count(), 4096);
//! assert!(!table.is_complete());
//! ```

use crate::error::PartscanError;
use crate::identifiers::{PartitionId, RecordDigest};
use serde::{Deserialize, Serialize};

/// Maximum number of partitions a table can track
///
/// Bounded by the u16 width of [`PartitionId`].
pub const MAX_PARTITIONS: usize = 65536;

/// Scan progress for a single partition
///
/// While a partition is unfinished, `cursor` holds the digest of the last
/// record delivered from it, or `None` if no record has been delivered yet.
/// Once `done` is set the cursor is cleared; it carries no meaning for a
/// finished partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStatus {
    partition_id: PartitionId,
    done: bool,
    cursor: Option<RecordDigest>,
}

impl PartitionStatus {
    /// Create a fresh status: not done, no cursor
    pub fn new(partition_id: PartitionId) -> Self {
        Self {
            partition_id,
            done: false,
            cursor: None,
        }
    }

    /// The partition this status describes
    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// Whether this partition has been fully scanned
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The resume cursor, present only while the partition is unfinished
    pub fn cursor(&self) -> Option<RecordDigest> {
        self.cursor
    }

    /// Record that `digest` was delivered from this partition
    pub(crate) fn advance_cursor(&mut self, digest: RecordDigest) {
        self.cursor = Some(digest);
    }

    /// Mark the partition fully scanned, clearing the cursor
    pub(crate) fn mark_done(&mut self) {
        self.done = true;
        self.cursor = None;
    }

    /// Rebuild a status from its persisted parts
    pub(crate) fn from_parts(
        partition_id: PartitionId,
        done: bool,
        cursor: Option<RecordDigest>,
    ) -> Self {
        Self {
            partition_id,
            done,
            cursor,
        }
    }
}

/// Dense per-partition progress table for one namespace
///
/// Entry `i` always describes partition `i`; the table covers partitions
/// `0..partition_count` with no gaps. Tables are cheap to clone and compare,
/// and serialize to a compact byte format via the
/// [`checkpoint`](crate::checkpoint) module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStatusTable {
    entries: Vec<PartitionStatus>,
}

impl PartitionStatusTable {
    /// Create a fresh table for a namespace with `partition_count` partitions
    ///
    /// Every entry starts unfinished with no cursor, so a scan restricted by
    /// a fresh table visits every partition from the beginning.
    pub fn new(partition_count: usize) -> Result<Self, PartscanError> {
        if partition_count == 0 {
            return Err(PartscanError::config(
                "partition_count: must be greater than 0",
            ));
        }
        if partition_count > MAX_PARTITIONS {
            return Err(PartscanError::config(format!(
                "partition_count: {} exceeds maximum {}",
                partition_count, MAX_PARTITIONS
            )));
        }
        let entries = (0..partition_count)
            .map(|i| PartitionStatus::new(PartitionId::new(i as u16)))
            .collect();
        Ok(Self { entries })
    }

    /// Rebuild a table from already-validated entries
    ///
    /// Callers must ensure entries are dense and ordered by partition id.
    pub(crate) fn from_entries(entries: Vec<PartitionStatus>) -> Self {
        Self { entries }
    }

    /// Number of partitions this table tracks
    pub fn partition_count(&self) -> usize {
        self.entries.len()
    }

    /// Look up the status of one partition
    pub fn entry(&self, partition_id: PartitionId) -> Option<&PartitionStatus> {
        self.entries.get(partition_id.index())
    }

    /// Iterate over all partition statuses in partition order
    pub fn entries(&self) -> impl Iterator<Item = &PartitionStatus> {
        self.entries.iter()
    }

    /// Iterate over partitions that still need scanning
    pub fn pending(&self) -> impl Iterator<Item = &PartitionStatus> {
        self.entries.iter().filter(|status| !status.done)
    }

    /// Whether every partition has been fully scanned
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|status| status.done)
    }

    /// Number of fully scanned partitions
    pub fn done_count(&self) -> usize {
        self.entries.iter().filter(|status| status.done).count()
    }

    /// Number of partitions still pending
    pub fn pending_count(&self) -> usize {
        self.entries.len() - self.done_count()
    }

    /// Record that `digest` was delivered from `partition_id`
    pub(crate) fn advance_cursor(&mut self, partition_id: PartitionId, digest: RecordDigest) {
        if let Some(status) = self.entries.get_mut(partition_id.index()) {
            status.advance_cursor(digest);
        }
    }

    /// Mark `partition_id` fully scanned
    pub(crate) fn mark_done(&mut self, partition_id: PartitionId) {
        if let Some(status) = self.entries.get_mut(partition_id.index()) {
            status.mark_done();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(seed: u8) -> RecordDigest {
        RecordDigest::from_bytes([seed; 20])
    }

    #[test]
    fn test_fresh_table_is_all_pending() {
        let table = PartitionStatusTable::new(16).unwrap();
        assert_eq!(table.partition_count(), 16);
        assert_eq!(table.pending_count(), 16);
        assert_eq!(table.done_count(), 0);
        assert!(!table.is_complete());
        for (i, status) in table.entries().enumerate() {
            assert_eq!(status.partition_id().index(), i);
            assert!(!status.is_done());
            assert_eq!(status.cursor(), None);
        }
    }

    #[test]
    fn test_new_rejects_zero_partitions() {
        assert!(matches!(
            PartitionStatusTable::new(0),
            Err(PartscanError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_oversized_partition_count() {
        assert!(PartitionStatusTable::new(MAX_PARTITIONS).is_ok());
        assert!(matches!(
            PartitionStatusTable::new(MAX_PARTITIONS + 1),
            Err(PartscanError::Config(_))
        ));
    }

    #[test]
    fn test_advance_cursor_sets_cursor() {
        let mut table = PartitionStatusTable::new(4).unwrap();
        let id = PartitionId::new(2);
        table.advance_cursor(id, digest(9));
        let status = table.entry(id).unwrap();
        assert_eq!(status.cursor(), Some(digest(9)));
        assert!(!status.is_done());
    }

    #[test]
    fn test_mark_done_clears_cursor() {
        let mut table = PartitionStatusTable::new(4).unwrap();
        let id = PartitionId::new(1);
        table.advance_cursor(id, digest(5));
        table.mark_done(id);
        let status = table.entry(id).unwrap();
        assert!(status.is_done());
        assert_eq!(status.cursor(), None);
    }

    #[test]
    fn test_pending_iterator_skips_done() {
        let mut table = PartitionStatusTable::new(4).unwrap();
        table.mark_done(PartitionId::new(0));
        table.mark_done(PartitionId::new(2));
        let pending: Vec<u16> = table.pending().map(|s| s.partition_id().raw()).collect();
        assert_eq!(pending, vec![1, 3]);
        assert_eq!(table.pending_count(), 2);
        assert_eq!(table.done_count(), 2);
    }

    #[test]
    fn test_complete_detection() {
        let mut table = PartitionStatusTable::new(3).unwrap();
        for i in 0..3 {
            table.mark_done(PartitionId::new(i));
        }
        assert!(table.is_complete());
        assert_eq!(table.pending_count(), 0);
    }

    #[test]
    fn test_entry_out_of_range() {
        let table = PartitionStatusTable::new(2).unwrap();
        assert!(table.entry(PartitionId::new(5)).is_none());
    }

    #[test]
    fn test_table_equality_tracks_progress() {
        let mut first = PartitionStatusTable::new(4).unwrap();
        let second = PartitionStatusTable::new(4).unwrap();
        assert_eq!(first, second);
        first.advance_cursor(PartitionId::new(0), digest(1));
        assert_ne!(first, second);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = PartitionStatusTable::new(4).unwrap();
        let snapshot = original.clone();
        original.mark_done(PartitionId::new(0));
        assert_eq!(snapshot.done_count(), 0);
        assert_eq!(original.done_count(), 1);
    }
}
