//! Paginated scan walkthrough
//!
//! Seeds an in-memory store, pages through a predicate query in fixed-size
//! batches while checkpointing progress to disk, then abandons the scan
//! mid-way and finishes it with a fresh set of components resumed from the
//! checkpoint file alone.
//!
//! Run with: `cargo run --example paginate`

use partscan::prelude::*;
use std::sync::Arc;
use tracing::info;

const NAMESPACE: &str = "test";
const SET: &str = "demo";
const BIN: &str = "rank";
const RECORD_COUNT: i64 = 100;
const PAGE_SIZE: u32 = 25;
const PARTITION_COUNT: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(MemoryStore::new(PARTITION_COUNT, [NAMESPACE])?);
    for i in 0..RECORD_COUNT {
        store.put(NAMESPACE, SET, &format!("key-{}", i), [(BIN, BinValue::Int(i))])?;
    }
    info!(
        "Seeded {} records across {} partitions",
        RECORD_COUNT, PARTITION_COUNT
    );

    let query = QueryDescriptor::new(NAMESPACE, SET, Predicate::range(BIN, 0, RECORD_COUNT))
        .paginate(true)
        .build()?;

    let checkpoint_dir = tempfile::tempdir()?;
    let checkpoint_path = checkpoint_dir.path().join("scan.checkpoint");

    // Page through by hand, keeping a checkpoint current on disk, then walk
    // away after two pages as an interrupted client would
    let executor = PartitionExecutor::new(Arc::clone(&store));
    let mut restriction: Option<PartitionStatusTable> = None;
    let mut delivered = 0u64;
    for page in 1..=2u32 {
        let mut counter = ResultCounter::new(PAGE_SIZE);
        let table = executor
            .execute(&query, restriction.as_ref(), |event| match event {
                ScanEvent::Record(_) => counter.admit(),
                ScanEvent::Complete => ScanDecision::Continue,
            })
            .await?;

        delivered += u64::from(counter.count());
        info!("query page {}: count {}", page, counter.count());
        save_table(&table, &checkpoint_path)?;
        restriction = Some(table);
    }
    info!(
        "Interrupted after {} records; checkpoint at {}",
        delivered,
        checkpoint_path.display()
    );

    // A fresh pager finishes the scan from the checkpoint file alone
    let table = load_table(&checkpoint_path)?;
    info!(
        "Loaded checkpoint: {} of {} partitions pending",
        table.pending_count(),
        table.partition_count()
    );

    let pager = QueryPager::new(store);
    let mut resumed = 0u64;
    pager
        .resume(&query, PAGE_SIZE, table, |_| {
            resumed += 1;
        })
        .await?;

    info!(
        "Resumed scan delivered {} records, {} in total",
        resumed,
        delivered + resumed
    );
    assert_eq!(delivered + resumed, RECORD_COUNT as u64);
    Ok(())
}
