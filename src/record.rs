//! Record and bin value types
//!
//! A record is the unit of delivery for a scan: a digest identifying it plus a
//! set of named bins. Bins are loosely typed, mirroring what the store holds.
//!
//! # Usage Examples
//!
//! ```rust
//! use partscan::identifiers::RecordDigest;
//! use partscan::record::{BinValue, Record};
//!
//! let record = Record::new(RecordDigest::from_bytes([7; 20]))
//!     .with_bin("name", "alpha")
//!     .with_bin("rank", 42i64);
//!
//! assert_eq!(record.int_bin("rank"), Some(42));
//! assert_eq!(record.bin("name"), Some(&BinValue::Str("alpha".to_string())));
//! ```

use crate::identifiers::RecordDigest;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single named value stored in a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinValue {
    /// Signed 64-bit integer
    Int(i64),
    /// UTF-8 string
    Str(String),
    /// Raw byte blob
    Bytes(Vec<u8>),
}

impl BinValue {
    /// The integer payload, if this value is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The string payload, if this value is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// The byte payload, if this value is a blob
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for BinValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for BinValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for BinValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<u8>> for BinValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// A record delivered by a scan pass
///
/// The digest is the record's identity and resume cursor. Bins carry the
/// record's payload keyed by bin name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Digest identifying this record within its partition
    pub digest: RecordDigest,
    bins: FxHashMap<String, BinValue>,
}

impl Record {
    /// Create an empty record with the given digest
    pub fn new(digest: RecordDigest) -> Self {
        Self {
            digest,
            bins: FxHashMap::default(),
        }
    }

    /// Set a bin, replacing any previous value under the same name
    pub fn set_bin(&mut self, name: impl Into<String>, value: impl Into<BinValue>) {
        self.bins.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`set_bin`](Self::set_bin)
    pub fn with_bin(mut self, name: impl Into<String>, value: impl Into<BinValue>) -> Self {
        self.set_bin(name, value);
        self
    }

    /// Look up a bin by name
    pub fn bin(&self, name: &str) -> Option<&BinValue> {
        self.bins.get(name)
    }

    /// Look up an integer bin by name
    ///
    /// Returns `None` when the bin is absent or holds a non-integer value.
    pub fn int_bin(&self, name: &str) -> Option<i64> {
        self.bins.get(name).and_then(BinValue::as_int)
    }

    /// All bins on this record
    pub fn bins(&self) -> &FxHashMap<String, BinValue> {
        &self.bins
    }

    /// Number of bins on this record
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }
}
