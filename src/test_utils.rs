//! Test utilities for partscan testing
//!
//! This module provides common helpers for testing scan components,
//! including RAII-based temporary directory management and standardized
//! store builders to eliminate duplication across the test suite.

use crate::memory_store::MemoryStore;
use crate::query::{Predicate, QueryDescriptor};
use crate::record::BinValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Namespace used by the standard test stores
pub const NAMESPACE: &str = "test";

/// Set used by the standard test stores
pub const SET: &str = "demo";

/// Integer bin carrying each test record's value
pub const BIN: &str = "rank";

/// RAII-based test environment for isolated testing
///
/// TestEnvironment provides each test with its own temporary directory that
/// is automatically cleaned up when the test completes.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub test_name: String,
}

impl TestEnvironment {
    /// Create a new test environment with the given test name
    ///
    /// # Panics
    /// Panics if unable to create the temporary directory
    pub fn new(test_name: &str) -> Self {
        let temp_dir = TempDir::new()
            .unwrap_or_else(|e| panic!("Failed to create temp dir for test {}: {}", test_name, e));

        Self {
            temp_dir,
            test_name: test_name.to_string(),
        }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Build a path to a file inside the temporary directory
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// Build a store with `records` integer records spread over `partition_count` partitions
///
/// Record `i` is written under key `key-i` with [`BIN`] holding `i`, so tests
/// can recover each record's position from its bin value.
pub fn populated_store(partition_count: usize, records: i64) -> Arc<MemoryStore> {
    let store = MemoryStore::new(partition_count, [NAMESPACE]).unwrap();
    for i in 0..records {
        store
            .put(NAMESPACE, SET, &format!("key-{}", i), [(BIN, BinValue::Int(i))])
            .unwrap();
    }
    Arc::new(store)
}

/// Build a sequential paginated query matching [`BIN`] values in `[low, high]`
pub fn paginated_query(low: i64, high: i64) -> QueryDescriptor {
    QueryDescriptor::new(NAMESPACE, SET, Predicate::range(BIN, low, high))
        .paginate(true)
        .build()
        .unwrap()
}

/// Build a concurrent paginated query matching [`BIN`] values in `[low, high]`
pub fn concurrent_query(low: i64, high: i64) -> QueryDescriptor {
    QueryDescriptor::new(NAMESPACE, SET, Predicate::range(BIN, low, high))
        .concurrent(true)
        .paginate(true)
        .build()
        .unwrap()
}
