//! Partition executor for bounded scan passes
//!
//! This module runs one pass of a partitioned query: it visits every pending
//! partition, delivers matching records to a caller-supplied callback, and
//! returns an updated [`PartitionStatusTable`] describing exactly how far the
//! pass got. The callback decides after every record whether the pass keeps
//! going, which is what makes passes bounded and resumable.
//!
//! # Delivery Contract
//!
//! - Records are delivered one at a time; the callback is never invoked
//!   concurrently, even when partitions are scanned in parallel.
//! - A record's cursor is advanced only when the callback returns
//!   [`ScanDecision::Continue`]. The record that triggers a
//!   [`ScanDecision::Stop`] is observed but not committed, so a resumed scan
//!   delivers it again. Callers see every record at least once.
//! - A partition is marked done only after its stream is exhausted without a
//!   stop.
//! - After the last record of a non-failed pass, the callback receives a
//!   single [`ScanEvent::Complete`] sentinel.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use partscan::executor::{PartitionExecutor, ScanDecision, ScanEvent};
//! use partscan::memory_store::MemoryStore;
//! use partscan::query::{Predicate, QueryDescriptor};
//! use partscan::record::BinValue;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), partscan::PartscanError> {
//! let store = Arc::new(MemoryStore::new(4, ["test"])?);
//! store.put("test", "demo", "key-1", [("rank", BinValue::Int(3))])?;
//!
//! let query = QueryDescriptor::new("test", "demo", Predicate::range("rank", 0, 10))
//!     .paginate(true)
//!     .build()?;
//!
//! let executor = PartitionExecutor::new(store);
//! let mut seen = 0;
//! let table = executor
//!     .execute(&query, None, |event| {
//!         if let ScanEvent::Record(_) = event {
//!             seen += 1;
//!         }
//!         ScanDecision::Continue
//!     })
//!     .await?;
//!
//! assert_eq!(seen, 1);
//! assert!(table.is_complete());
//! # Ok(()) }
//! ```

use crate::error::PartscanError;
use crate::identifiers::{PartitionId, RecordDigest};
use crate::query::QueryDescriptor;
use crate::record::Record;
use crate::status::PartitionStatusTable;
use crate::store::PartitionStore;
use crate::Result;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default capacity of the record channel used by concurrent passes
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Caller verdict after observing a scan event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDecision {
    /// Keep delivering records
    Continue,
    /// End the pass now; undelivered records stay pending for a resume
    Stop,
}

/// One event delivered to the scan callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A record matching the query predicate
    Record(Record),
    /// End of pass: every pending partition was exhausted or the callback
    /// stopped the pass
    Complete,
}

/// Messages sent by partition producer tasks to the delivering task
#[derive(Debug)]
enum PartitionMessage {
    /// A record scanned from one partition
    Record {
        partition: PartitionId,
        record: Record,
    },
    /// The partition's stream ended with no records left
    Exhausted { partition: PartitionId },
    /// The partition scan failed; the pass must abort
    Failed { error: PartscanError },
}

/// Runs bounded scan passes against a [`PartitionStore`]
///
/// The executor is stateless between passes; all progress lives in the
/// returned status tables, so one executor can serve any number of
/// interleaved scans.
pub struct PartitionExecutor<S> {
    store: Arc<S>,
    channel_capacity: usize,
}

impl<S: PartitionStore + 'static> PartitionExecutor<S> {
    /// Create an executor over the given store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Set the record channel capacity used by concurrent passes
    ///
    /// Capacities below 1 are treated as 1.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Run one scan pass and return the updated partition status table
    ///
    /// With no `restriction`, a fresh table is created and every partition is
    /// scanned from the beginning. With a restriction, only partitions the
    /// table leaves pending are visited, each from its saved cursor. The
    /// restriction must cover exactly the namespace's partition count or the
    /// pass fails with [`PartscanError::ProtocolViolation`] before any record
    /// is delivered.
    ///
    /// On error the pass aborts without returning a table; any restriction
    /// table the caller still holds remains valid for a retry.
    pub async fn execute<F>(
        &self,
        query: &QueryDescriptor,
        restriction: Option<&PartitionStatusTable>,
        mut callback: F,
    ) -> Result<PartitionStatusTable>
    where
        F: FnMut(ScanEvent) -> ScanDecision + Send,
    {
        query.validate()?;

        let cluster_partitions = self.store.partition_count(query.namespace()).await?;
        let mut table = match restriction {
            Some(existing) => {
                if existing.partition_count() != cluster_partitions {
                    return Err(PartscanError::protocol_violation(
                        cluster_partitions,
                        existing.partition_count(),
                    ));
                }
                existing.clone()
            }
            None => PartitionStatusTable::new(cluster_partitions)?,
        };

        let pending: Vec<(PartitionId, Option<RecordDigest>)> = table
            .pending()
            .map(|status| (status.partition_id(), status.cursor()))
            .collect();

        if pending.is_empty() {
            debug!(
                "All {} partitions already done, nothing to scan",
                cluster_partitions
            );
            callback(ScanEvent::Complete);
            return Ok(table);
        }

        debug!(
            "Starting {} pass over {} pending of {} partitions in '{}/{}'",
            if query.is_concurrent() {
                "concurrent"
            } else {
                "sequential"
            },
            pending.len(),
            cluster_partitions,
            query.namespace(),
            query.set()
        );

        if query.is_concurrent() {
            self.run_concurrent(query, pending, &mut table, &mut callback)
                .await?;
        } else {
            self.run_sequential(query, pending, &mut table, &mut callback)
                .await?;
        }

        callback(ScanEvent::Complete);
        Ok(table)
    }

    /// Scan pending partitions one after another in partition order
    async fn run_sequential<F>(
        &self,
        query: &QueryDescriptor,
        pending: Vec<(PartitionId, Option<RecordDigest>)>,
        table: &mut PartitionStatusTable,
        callback: &mut F,
    ) -> Result<()>
    where
        F: FnMut(ScanEvent) -> ScanDecision + Send,
    {
        let mut delivered = 0usize;
        'partitions: for (partition, cursor) in pending {
            let mut records = self.store.scan_partition(query, partition, cursor).await?;
            while let Some(item) = records.next().await {
                let record = item?;
                let digest = record.digest;
                match callback(ScanEvent::Record(record)) {
                    ScanDecision::Continue => {
                        table.advance_cursor(partition, digest);
                        delivered += 1;
                    }
                    ScanDecision::Stop => {
                        debug!("Callback stopped the pass after {} records", delivered);
                        break 'partitions;
                    }
                }
            }
            table.mark_done(partition);
        }
        Ok(())
    }

    /// Scan pending partitions in parallel, delivering records from one task
    ///
    /// Each pending partition gets a producer task feeding a bounded channel.
    /// This task drains the channel and invokes the callback, so deliveries
    /// stay serialized. On stop or failure the remaining producers are
    /// signalled and aborted; records still buffered in the channel are
    /// discarded without advancing any cursor.
    async fn run_concurrent<F>(
        &self,
        query: &QueryDescriptor,
        pending: Vec<(PartitionId, Option<RecordDigest>)>,
        table: &mut PartitionStatusTable,
        callback: &mut F,
    ) -> Result<()>
    where
        F: FnMut(ScanEvent) -> ScanDecision + Send,
    {
        let (sender, mut receiver) = mpsc::channel(self.channel_capacity);
        let stop_signal = Arc::new(AtomicBool::new(false));

        let mut producers = Vec::with_capacity(pending.len());
        for (partition, cursor) in pending {
            let store = Arc::clone(&self.store);
            let query = query.clone();
            let sender = sender.clone();
            let stop_signal = Arc::clone(&stop_signal);

            producers.push(tokio::spawn(async move {
                let mut records = match store.scan_partition(&query, partition, cursor).await {
                    Ok(stream) => stream,
                    Err(error) => {
                        let _ = sender.send(PartitionMessage::Failed { error }).await;
                        return;
                    }
                };
                loop {
                    if stop_signal.load(Ordering::SeqCst) {
                        return;
                    }
                    match records.next().await {
                        Some(Ok(record)) => {
                            let message = PartitionMessage::Record { partition, record };
                            if sender.send(message).await.is_err() {
                                return;
                            }
                        }
                        Some(Err(error)) => {
                            let _ = sender.send(PartitionMessage::Failed { error }).await;
                            return;
                        }
                        None => {
                            let _ = sender.send(PartitionMessage::Exhausted { partition }).await;
                            return;
                        }
                    }
                }
            }));
        }
        // Producers hold the remaining senders; recv() ends when they finish
        drop(sender);

        let mut outcome = Ok(());
        let mut delivered = 0usize;
        while let Some(message) = receiver.recv().await {
            match message {
                PartitionMessage::Record { partition, record } => {
                    let digest = record.digest;
                    match callback(ScanEvent::Record(record)) {
                        ScanDecision::Continue => {
                            table.advance_cursor(partition, digest);
                            delivered += 1;
                        }
                        ScanDecision::Stop => {
                            debug!("Callback stopped the pass after {} records", delivered);
                            stop_signal.store(true, Ordering::SeqCst);
                            break;
                        }
                    }
                }
                PartitionMessage::Exhausted { partition } => {
                    table.mark_done(partition);
                }
                PartitionMessage::Failed { error } => {
                    warn!("Partition scan failed, aborting pass: {}", error);
                    stop_signal.store(true, Ordering::SeqCst);
                    outcome = Err(error);
                    break;
                }
            }
        }
        // Unblocks producers waiting on channel capacity; buffered records
        // are dropped here without touching any cursor
        drop(receiver);

        for producer in &producers {
            producer.abort();
        }
        for producer in producers {
            let _ = producer.await;
        }

        outcome
    }
}
