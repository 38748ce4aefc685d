//! Query descriptors and predicates
//!
//! This module provides the immutable description of a partitioned query:
//! which namespace and set to scan, the predicate records must satisfy, and
//! the execution flags controlling concurrency and pagination.
//!
//! # Usage Examples
//!
//! ```rust
//! use partscan::query::{Predicate, QueryDescriptor};
//!
//! let query = QueryDescriptor::new("test", "demo", Predicate::range("rank", 0, 100))
//!     .concurrent(true)
//!     .paginate(true)
//!     .build()
//!     .unwrap();
//!
//! assert!(query.is_concurrent());
//! assert_eq!(query.predicate().attribute(), "rank");
//! ```

use crate::error::PartscanError;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range filter over a single record attribute
///
/// A record matches when it carries an integer bin with the predicate's
/// attribute name and the value falls inside `[low, high]`. Records without
/// the attribute, or with a non-integer value under it, never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    attribute: String,
    low: i64,
    high: i64,
}

impl Predicate {
    /// Create a range predicate over `attribute` matching values in `[low, high]`
    pub fn range(attribute: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            attribute: attribute.into(),
            low,
            high,
        }
    }

    /// The attribute (bin name) this predicate filters on
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Inclusive lower bound
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Inclusive upper bound
    pub fn high(&self) -> i64 {
        self.high
    }

    /// Validate the predicate bounds
    pub fn validate(&self) -> Result<(), PartscanError> {
        if self.attribute.is_empty() {
            return Err(PartscanError::config(
                "predicate.attribute: must not be empty",
            ));
        }
        if self.low > self.high {
            return Err(PartscanError::InvalidPredicate {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Evaluate this predicate against a record
    pub fn matches(&self, record: &Record) -> bool {
        record
            .int_bin(&self.attribute)
            .is_some_and(|value| value >= self.low && value <= self.high)
    }
}

/// Immutable description of one partitioned query
///
/// A descriptor names the namespace and set to scan, the predicate applied to
/// every record, and two execution flags: `concurrent` selects parallel
/// partition fan-out, `paginate` marks the query as bounded and resumable.
///
/// Descriptors are immutable once built. A resumed scan constructs a fresh
/// descriptor (or clones this one) carrying the same predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    namespace: String,
    set: String,
    predicate: Predicate,
    concurrent: bool,
    paginate: bool,
}

impl QueryDescriptor {
    /// Start building a descriptor with defaults: sequential, unpaginated
    pub fn new(namespace: impl Into<String>, set: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            namespace: namespace.into(),
            set: set.into(),
            predicate,
            concurrent: false,
            paginate: false,
        }
    }

    /// Enable or disable parallel partition fan-out
    pub fn concurrent(mut self, enabled: bool) -> Self {
        self.concurrent = enabled;
        self
    }

    /// Enable or disable bounded, resumable execution
    pub fn paginate(mut self, enabled: bool) -> Self {
        self.paginate = enabled;
        self
    }

    /// Validate the descriptor
    pub fn validate(&self) -> Result<(), PartscanError> {
        if self.namespace.is_empty() {
            return Err(PartscanError::config("namespace: must not be empty"));
        }
        if self.set.is_empty() {
            return Err(PartscanError::config("set: must not be empty"));
        }
        self.predicate.validate()
    }

    /// Build the descriptor after validation
    pub fn build(self) -> Result<Self, PartscanError> {
        self.validate()?;
        Ok(self)
    }

    /// The namespace this query scans
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The set this query scans
    pub fn set(&self) -> &str {
        &self.set
    }

    /// The predicate applied to every record
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Whether partitions are scanned in parallel
    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    /// Whether this query runs bounded passes that can be resumed
    pub fn is_paginated(&self) -> bool {
        self.paginate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::RecordDigest;

    fn record_with(value: i64) -> Record {
        Record::new(RecordDigest::from_bytes([1; 20])).with_bin("rank", value)
    }

    #[test]
    fn test_predicate_accessors() {
        let predicate = Predicate::range("rank", -5, 5);
        assert_eq!(predicate.attribute(), "rank");
        assert_eq!(predicate.low(), -5);
        assert_eq!(predicate.high(), 5);
    }

    #[test]
    fn test_predicate_matches_inclusive_bounds() {
        let predicate = Predicate::range("rank", 0, 9);
        assert!(predicate.matches(&record_with(0)));
        assert!(predicate.matches(&record_with(9)));
        assert!(!predicate.matches(&record_with(-1)));
        assert!(!predicate.matches(&record_with(10)));
    }

    #[test]
    fn test_predicate_ignores_missing_attribute() {
        let predicate = Predicate::range("rank", 0, 9);
        let record = Record::new(RecordDigest::from_bytes([2; 20])).with_bin("other", 5i64);
        assert!(!predicate.matches(&record));
    }

    #[test]
    fn test_predicate_ignores_non_integer_attribute() {
        let predicate = Predicate::range("rank", 0, 9);
        let record = Record::new(RecordDigest::from_bytes([3; 20])).with_bin("rank", "five");
        assert!(!predicate.matches(&record));
    }

    #[test]
    fn test_predicate_rejects_inverted_bounds() {
        let result = Predicate::range("rank", 10, 3).validate();
        assert!(matches!(
            result,
            Err(PartscanError::InvalidPredicate { low: 10, high: 3 })
        ));
    }

    #[test]
    fn test_predicate_accepts_equal_bounds() {
        assert!(Predicate::range("rank", 7, 7).validate().is_ok());
    }

    #[test]
    fn test_descriptor_defaults() {
        let query = QueryDescriptor::new("test", "demo", Predicate::range("rank", 0, 1))
            .build()
            .unwrap();
        assert!(!query.is_concurrent());
        assert!(!query.is_paginated());
        assert_eq!(query.namespace(), "test");
        assert_eq!(query.set(), "demo");
    }

    #[test]
    fn test_descriptor_builder_flags() {
        let query = QueryDescriptor::new("test", "demo", Predicate::range("rank", 0, 1))
            .concurrent(true)
            .paginate(true)
            .build()
            .unwrap();
        assert!(query.is_concurrent());
        assert!(query.is_paginated());
    }

    #[test]
    fn test_descriptor_rejects_empty_namespace() {
        let result = QueryDescriptor::new("", "demo", Predicate::range("rank", 0, 1)).build();
        assert!(matches!(result, Err(PartscanError::Config(_))));
    }

    #[test]
    fn test_descriptor_rejects_empty_set() {
        let result = QueryDescriptor::new("test", "", Predicate::range("rank", 0, 1)).build();
        assert!(matches!(result, Err(PartscanError::Config(_))));
    }

    #[test]
    fn test_descriptor_rejects_empty_attribute() {
        let result = QueryDescriptor::new("test", "demo", Predicate::range("", 0, 1)).build();
        assert!(matches!(result, Err(PartscanError::Config(_))));
    }

    #[test]
    fn test_descriptor_propagates_predicate_bounds_error() {
        let result = QueryDescriptor::new("test", "demo", Predicate::range("rank", 2, 1)).build();
        assert!(matches!(
            result,
            Err(PartscanError::InvalidPredicate { .. })
        ));
    }

    #[test]
    fn test_descriptor_clone_preserves_predicate() {
        let query = QueryDescriptor::new("test", "demo", Predicate::range("rank", 3, 8))
            .paginate(true)
            .build()
            .unwrap();
        let copy = query.clone();
        assert_eq!(copy, query);
        assert_eq!(copy.predicate().low(), 3);
    }
}
