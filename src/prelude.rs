//! Prelude module providing commonly used types and imports
//!
//! Importing `partscan::prelude::*` brings in everything needed for the
//! typical scan workflow: building a query, running bounded passes, and
//! checkpointing progress.

pub use crate::checkpoint::{load_table, save_table};
pub use crate::error::PartscanError;
pub use crate::executor::{PartitionExecutor, ScanDecision, ScanEvent};
pub use crate::identifiers::{PartitionId, RecordDigest};
pub use crate::memory_store::MemoryStore;
pub use crate::pagination::{QueryPager, ResultCounter};
pub use crate::query::{Predicate, QueryDescriptor};
pub use crate::record::{BinValue, Record};
pub use crate::status::{PartitionStatus, PartitionStatusTable};
pub use crate::store::{PartitionStore, RecordStream};
pub use crate::Result;
