//! Common test utilities for integration tests
//!
//! This module provides shared utilities for integration tests that cannot
//! access the main crate's test_utils module.

use partscan::memory_store::MemoryStore;
use partscan::query::{Predicate, QueryDescriptor};
use partscan::record::BinValue;
use std::sync::Arc;

/// Test constants for consistent configuration across integration tests
pub mod test_constants {
    pub const NAMESPACE: &str = "test";
    pub const SET: &str = "demo";
    pub const BIN: &str = "rank";
}

/// Key under which record `i` is stored by [`populated_store`]
#[allow(dead_code)]
pub fn key(i: i64) -> String {
    format!("key-{}", i)
}

/// Build a store with `records` integer records spread over `partition_count` partitions
///
/// Record `i` carries `BIN = i`, so tests can recover each record's identity
/// from its bin value.
#[allow(dead_code)]
pub fn populated_store(partition_count: usize, records: i64) -> Arc<MemoryStore> {
    let store = MemoryStore::new(partition_count, [test_constants::NAMESPACE])
        .expect("Failed to create test store");
    for i in 0..records {
        store
            .put(
                test_constants::NAMESPACE,
                test_constants::SET,
                &key(i),
                [(test_constants::BIN, BinValue::Int(i))],
            )
            .expect("Failed to populate test store");
    }
    Arc::new(store)
}

/// Build a sequential paginated query matching values in `[low, high]`
#[allow(dead_code)]
pub fn scan_query(low: i64, high: i64) -> QueryDescriptor {
    QueryDescriptor::new(
        test_constants::NAMESPACE,
        test_constants::SET,
        Predicate::range(test_constants::BIN, low, high),
    )
    .paginate(true)
    .build()
    .expect("Failed to build test query")
}

/// Build a concurrent paginated query matching values in `[low, high]`
#[allow(dead_code)]
pub fn concurrent_scan_query(low: i64, high: i64) -> QueryDescriptor {
    QueryDescriptor::new(
        test_constants::NAMESPACE,
        test_constants::SET,
        Predicate::range(test_constants::BIN, low, high),
    )
    .concurrent(true)
    .paginate(true)
    .build()
    .expect("Failed to build test query")
}
