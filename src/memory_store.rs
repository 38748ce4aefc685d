//! In-process partitioned record store
//!
//! This module provides [`MemoryStore`], an in-memory implementation of
//! [`PartitionStore`](crate::store::PartitionStore). Records are distributed
//! across a fixed number of partitions by digest, and each partition keeps
//! its records in digest order, so scans are stable and resumable exactly
//! like scans against a networked cluster.
//!
//! The store is the reference implementation used by the examples, the test
//! suite, and the benchmarks. It also supports per-partition fault injection
//! so error paths can be exercised deterministically.
//!
//! # Usage Examples
//!
//! ```rust
//! use partscan::memory_store::MemoryStore;
//! use partscan::record::BinValue;
//!
//! let store = MemoryStore::new(8, ["test"]).unwrap();
//! store
//!     .put("test", "demo", "key-1", [("rank", BinValue::Int(5))])
//!     .unwrap();
//!
//! let record = store.get("test", "demo", "key-1").unwrap().unwrap();
//! assert_eq!(record.int_bin("rank"), Some(5));
//! ```

use crate::error::PartscanError;
use crate::identifiers::{PartitionId, RecordDigest, DIGEST_LENGTH};
use crate::query::QueryDescriptor;
use crate::record::{BinValue, Record};
use crate::status::MAX_PARTITIONS;
use crate::store::{PartitionStore, RecordStream};
use crate::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::ops::Bound;
use tracing::debug;

/// Native status codes reported by the store
///
/// These mirror the numeric codes a networked cluster attaches to failed
/// operations; they surface through [`PartscanError::Exec`].
pub mod status_code {
    /// The namespace is not configured on this store
    pub const NAMESPACE_NOT_FOUND: i32 = 20;
    /// The operation did not complete in time
    pub const TIMEOUT: i32 = 9;
}

/// Records of one set, split across partitions in digest order
struct SetData {
    partitions: Vec<BTreeMap<RecordDigest, Record>>,
}

impl SetData {
    fn new(partition_count: usize) -> Self {
        Self {
            partitions: (0..partition_count).map(|_| BTreeMap::new()).collect(),
        }
    }
}

/// All sets of one namespace
#[derive(Default)]
struct NamespaceData {
    sets: FxHashMap<String, SetData>,
}

/// In-memory partitioned store
///
/// Namespaces are fixed at construction, like a configured cluster. Sets are
/// created implicitly on first write. All operations are safe to call from
/// multiple tasks concurrently.
pub struct MemoryStore {
    partition_count: usize,
    namespaces: RwLock<FxHashMap<String, NamespaceData>>,
    faults: RwLock<FxHashMap<PartitionId, (i32, String)>>,
}

impl MemoryStore {
    /// Create a store with `partition_count` partitions and the given namespaces
    pub fn new<N, S>(partition_count: usize, namespaces: N) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
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

        let namespaces = namespaces
            .into_iter()
            .map(|name| (name.into(), NamespaceData::default()))
            .collect();
        Ok(Self {
            partition_count,
            namespaces: RwLock::new(namespaces),
            faults: RwLock::new(FxHashMap::default()),
        })
    }

    /// Compute the digest assigned to a record with the given set and key
    ///
    /// The mapping is deterministic, so every caller derives the same digest
    /// and therefore the same owning partition for a record.
    pub fn digest_of(set: &str, key: &str) -> RecordDigest {
        let mut front = DefaultHasher::new();
        set.hash(&mut front);
        key.hash(&mut front);

        let mut back = DefaultHasher::new();
        key.hash(&mut back);
        set.hash(&mut back);
        back.write_u16(0x9e37);

        let mut bytes = [0u8; DIGEST_LENGTH];
        bytes[0..8].copy_from_slice(&front.finish().to_le_bytes());
        bytes[8..16].copy_from_slice(&back.finish().to_le_bytes());
        bytes[16..20].copy_from_slice(&(key.len() as u32).to_le_bytes());
        RecordDigest::from_bytes(bytes)
    }

    /// Write a record, replacing any previous record under the same key
    ///
    /// Returns the digest assigned to the record.
    pub fn put<B, N>(&self, namespace: &str, set: &str, key: &str, bins: B) -> Result<RecordDigest>
    where
        B: IntoIterator<Item = (N, BinValue)>,
        N: Into<String>,
    {
        let digest = Self::digest_of(set, key);
        let partition = digest.partition_id(self.partition_count);

        let mut record = Record::new(digest);
        for (name, value) in bins {
            record.set_bin(name, value);
        }

        let mut namespaces = self.namespaces.write();
        let data = namespaces
            .get_mut(namespace)
            .ok_or_else(|| Self::unknown_namespace(namespace))?;
        let set_data = data
            .sets
            .entry(set.to_string())
            .or_insert_with(|| SetData::new(self.partition_count));
        set_data.partitions[partition.index()].insert(digest, record);
        Ok(digest)
    }

    /// Read a record back by key
    pub fn get(&self, namespace: &str, set: &str, key: &str) -> Result<Option<Record>> {
        let digest = Self::digest_of(set, key);
        let partition = digest.partition_id(self.partition_count);

        let namespaces = self.namespaces.read();
        let data = namespaces
            .get(namespace)
            .ok_or_else(|| Self::unknown_namespace(namespace))?;
        Ok(data
            .sets
            .get(set)
            .and_then(|set_data| set_data.partitions[partition.index()].get(&digest))
            .cloned())
    }

    /// Delete a record by key, returning whether it existed
    pub fn remove(&self, namespace: &str, set: &str, key: &str) -> Result<bool> {
        let digest = Self::digest_of(set, key);
        let partition = digest.partition_id(self.partition_count);

        let mut namespaces = self.namespaces.write();
        let data = namespaces
            .get_mut(namespace)
            .ok_or_else(|| Self::unknown_namespace(namespace))?;
        Ok(data
            .sets
            .get_mut(set)
            .map(|set_data| set_data.partitions[partition.index()].remove(&digest).is_some())
            .unwrap_or(false))
    }

    /// Total number of records in a set across all partitions
    pub fn record_count(&self, namespace: &str, set: &str) -> Result<usize> {
        let namespaces = self.namespaces.read();
        let data = namespaces
            .get(namespace)
            .ok_or_else(|| Self::unknown_namespace(namespace))?;
        Ok(data
            .sets
            .get(set)
            .map(|set_data| set_data.partitions.iter().map(BTreeMap::len).sum())
            .unwrap_or(0))
    }

    /// Make every scan of `partition` fail with the given code and message
    ///
    /// The fault stays active until [`clear_faults`](Self::clear_faults) is
    /// called, so retried passes keep failing deterministically.
    pub fn fail_partition(&self, partition: PartitionId, code: i32, message: impl Into<String>) {
        self.faults.write().insert(partition, (code, message.into()));
    }

    /// Remove all injected partition faults
    pub fn clear_faults(&self) {
        self.faults.write().clear();
    }

    fn unknown_namespace(namespace: &str) -> PartscanError {
        PartscanError::exec(
            status_code::NAMESPACE_NOT_FOUND,
            format!("namespace '{}' is not configured", namespace),
        )
    }
}

#[async_trait]
impl PartitionStore for MemoryStore {
    async fn partition_count(&self, namespace: &str) -> Result<usize> {
        let namespaces = self.namespaces.read();
        if !namespaces.contains_key(namespace) {
            return Err(Self::unknown_namespace(namespace));
        }
        Ok(self.partition_count)
    }

    async fn scan_partition(
        &self,
        query: &QueryDescriptor,
        partition: PartitionId,
        resume_after: Option<RecordDigest>,
    ) -> Result<RecordStream> {
        if partition.index() >= self.partition_count {
            return Err(PartscanError::config(format!(
                "partition {} out of range for {} partitions",
                partition, self.partition_count
            )));
        }
        if let Some((code, message)) = self.faults.read().get(&partition) {
            return Err(PartscanError::exec(*code, message.clone()));
        }

        let namespaces = self.namespaces.read();
        let data = namespaces
            .get(query.namespace())
            .ok_or_else(|| Self::unknown_namespace(query.namespace()))?;

        let records: Vec<Record> = match data.sets.get(query.set()) {
            Some(set_data) => {
                let tree = &set_data.partitions[partition.index()];
                let range = match resume_after {
                    Some(cursor) => tree.range((Bound::Excluded(cursor), Bound::Unbounded)),
                    None => tree.range((Bound::<RecordDigest>::Unbounded, Bound::Unbounded)),
                };
                range
                    .map(|(_, record)| record)
                    .filter(|record| query.predicate().matches(record))
                    .cloned()
                    .collect()
            }
            None => Vec::new(),
        };

        debug!(
            "Scanning partition {} of '{}/{}': {} matching records after cursor",
            partition,
            query.namespace(),
            query.set(),
            records.len()
        );
        Ok(stream::iter(records.into_iter().map(Ok)).boxed())
    }
}
