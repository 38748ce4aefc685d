//! Partscan - bounded, resumable scanning for partitioned key-value stores
//!
//! Partscan runs predicate queries against a partitioned record store in
//! bounded passes. Each pass delivers up to a fixed number of records and
//! returns a partition status table capturing exactly how far it got; feeding
//! that table into the next pass resumes the scan with no skipped records,
//! across process restarts and even across clients.

pub mod checkpoint;
pub mod error;
pub mod executor;
pub mod identifiers;
pub mod memory_store;
pub mod pagination;
pub mod prelude;
pub mod query;
pub mod record;
pub mod status;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use error::PartscanError;
pub use executor::{PartitionExecutor, ScanDecision, ScanEvent};
pub use identifiers::{PartitionId, RecordDigest};
pub use memory_store::MemoryStore;
pub use pagination::{QueryPager, ResultCounter};
pub use query::{Predicate, QueryDescriptor};
pub use record::{BinValue, Record};
pub use status::{PartitionStatus, PartitionStatusTable};
pub use store::{PartitionStore, RecordStream};

/// Type alias for Results using PartscanError
pub type Result<T> = std::result::Result<T, PartscanError>;
