//! Storage trait for partitioned record access
//!
//! This module defines [`PartitionStore`], the seam between the scan
//! machinery and whatever actually holds the records. The executor and pager
//! are written entirely against this trait; the crate ships
//! [`MemoryStore`](crate::memory_store::MemoryStore) as the in-process
//! implementation, and a networked client can implement the same contract.

use crate::identifiers::{PartitionId, RecordDigest};
use crate::query::QueryDescriptor;
use crate::record::Record;
use crate::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of records produced by one partition scan
///
/// Items arrive in ascending digest order. An `Err` item ends the stream.
pub type RecordStream = BoxStream<'static, Result<Record>>;

/// Access to a partitioned, digest-ordered record store
///
/// Implementations must uphold two guarantees the scan protocol depends on:
///
/// - Records within a partition are yielded in ascending digest order, and
///   the order is stable across calls while the data does not change.
/// - When `resume_after` is given, only records with a digest strictly
///   greater than it are yielded. The cursor record itself is excluded.
///
/// The predicate carried by the query descriptor is applied by the store, so
/// a yielded record always satisfies it.
#[async_trait]
pub trait PartitionStore: Send + Sync {
    /// Number of partitions in `namespace`
    ///
    /// The count is a property of the namespace, not of any query; every
    /// caller sees the same value while the namespace exists.
    async fn partition_count(&self, namespace: &str) -> Result<usize>;

    /// Scan one partition, yielding matching records after the cursor
    ///
    /// The returned stream owns everything it needs; it stays valid after
    /// the borrow of `query` ends.
    async fn scan_partition(
        &self,
        query: &QueryDescriptor,
        partition: PartitionId,
        resume_after: Option<RecordDigest>,
    ) -> Result<RecordStream>;
}
