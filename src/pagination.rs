//! Bounded pagination over partitioned scans
//!
//! This module turns single scan passes into a complete paginated query. A
//! [`ResultCounter`] caps how many records one pass delivers, and a
//! [`QueryPager`] repeats capped passes, feeding each pass the status table
//! produced by the previous one, until a pass delivers nothing.
//!
//! The record that trips the cap is observed by the executor but not
//! committed, so the next pass picks it up first. Across a full
//! [`run_to_completion`](QueryPager::run_to_completion) every matching record
//! reaches the caller exactly once.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use partscan::memory_store::MemoryStore;
//! use partscan::pagination::QueryPager;
//! use partscan::query::{Predicate, QueryDescriptor};
//! use partscan::record::BinValue;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), partscan::PartscanError> {
//! let store = Arc::new(MemoryStore::new(4, ["test"])?);
//! for i in 0..10 {
//!     store.put("test", "demo", &format!("key-{}", i), [("rank", BinValue::Int(i))])?;
//! }
//!
//! let query = QueryDescriptor::new("test", "demo", Predicate::range("rank", 0, 100))
//!     .paginate(true)
//!     .build()?;
//!
//! let pager = QueryPager::new(store);
//! let mut ranks = Vec::new();
//! pager
//!     .run_to_completion(&query, 3, |record| {
//!         ranks.push(record.int_bin("rank").unwrap());
//!     })
//!     .await?;
//!
//! ranks.sort();
//! assert_eq!(ranks, (0..10).collect::<Vec<_>>());
//! # Ok(()) }
//! ```

use crate::error::PartscanError;
use crate::executor::{PartitionExecutor, ScanDecision, ScanEvent};
use crate::query::QueryDescriptor;
use crate::record::Record;
use crate::status::PartitionStatusTable;
use crate::store::PartitionStore;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Per-pass record budget
///
/// The counter admits records until `max` have been counted, then answers
/// [`ScanDecision::Stop`] without counting. The record that sees the stop is
/// neither counted nor meant to be forwarded; it belongs to the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCounter {
    count: u32,
    max: u32,
}

impl ResultCounter {
    /// Create a counter admitting at most `max` records
    pub fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    /// Decide whether the next record fits in this pass's budget
    pub fn admit(&mut self) -> ScanDecision {
        if self.count >= self.max {
            return ScanDecision::Stop;
        }
        self.count += 1;
        ScanDecision::Continue
    }

    /// Number of records admitted so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The budget this counter was created with
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether the budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.max
    }
}

/// Drives a paginated query to completion in bounded passes
///
/// Each pass delivers at most `batch_size` records. Between passes the pager
/// carries the partition status table forward, so work never repeats beyond
/// the single uncommitted record at each pass boundary. The scan is finished
/// when a pass delivers zero records.
pub struct QueryPager<S> {
    executor: PartitionExecutor<S>,
}

impl<S: PartitionStore + 'static> QueryPager<S> {
    /// Create a pager over the given store with a default executor
    pub fn new(store: Arc<S>) -> Self {
        Self {
            executor: PartitionExecutor::new(store),
        }
    }

    /// Create a pager around an already-configured executor
    pub fn with_executor(executor: PartitionExecutor<S>) -> Self {
        Self { executor }
    }

    /// Direct access to the underlying executor
    ///
    /// Useful for running individual passes by hand, for example to persist
    /// a checkpoint between passes.
    pub fn executor(&self) -> &PartitionExecutor<S> {
        &self.executor
    }

    /// Run the query from the beginning until no records remain
    ///
    /// The query must be built with `paginate(true)`. `on_record` is invoked
    /// exactly once per matching record; passes and resume bookkeeping are
    /// invisible to it.
    pub async fn run_to_completion<F>(
        &self,
        query: &QueryDescriptor,
        batch_size: u32,
        on_record: F,
    ) -> Result<()>
    where
        F: FnMut(Record) + Send,
    {
        self.drive(query, batch_size, None, on_record).await
    }

    /// Resume a previously interrupted query from a saved status table
    ///
    /// The table is consumed; each pass replaces it with an updated one. On
    /// error the in-progress table is lost with the call, so callers planning
    /// to retry should checkpoint the table before resuming.
    pub async fn resume<F>(
        &self,
        query: &QueryDescriptor,
        batch_size: u32,
        table: PartitionStatusTable,
        on_record: F,
    ) -> Result<()>
    where
        F: FnMut(Record) + Send,
    {
        self.drive(query, batch_size, Some(table), on_record).await
    }

    async fn drive<F>(
        &self,
        query: &QueryDescriptor,
        batch_size: u32,
        mut restriction: Option<PartitionStatusTable>,
        mut on_record: F,
    ) -> Result<()>
    where
        F: FnMut(Record) + Send,
    {
        if !query.is_paginated() {
            return Err(PartscanError::config(
                "query descriptor was not built with paginate(true)",
            ));
        }

        let mut passes = 0u32;
        let mut total = 0u64;
        loop {
            let mut counter = ResultCounter::new(batch_size);
            let table = self
                .executor
                .execute(query, restriction.as_ref(), |event| match event {
                    ScanEvent::Record(record) => {
                        let decision = counter.admit();
                        if decision == ScanDecision::Continue {
                            on_record(record);
                        }
                        decision
                    }
                    ScanEvent::Complete => ScanDecision::Continue,
                })
                .await?;

            passes += 1;
            total += u64::from(counter.count());
            debug!(
                "Bounded pass {} delivered {} records, {} partitions pending",
                passes,
                counter.count(),
                table.pending_count()
            );

            if counter.count() == 0 {
                debug!("Scan drained after {} passes, {} records total", passes, total);
                return Ok(());
            }
            restriction = Some(table);
        }
    }
}
