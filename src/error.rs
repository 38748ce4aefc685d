//! Error types for partitioned scan operations
//!
//! This module defines the error type used throughout the crate, providing
//! clear error messages and proper error chaining support.

use thiserror::Error;

/// Main error type for all scan operations
#[derive(Debug, Error)]
pub enum PartscanError {
    /// IO operations failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Predicate range bounds are inverted
    #[error("Invalid predicate: lower bound {low} exceeds upper bound {high}")]
    InvalidPredicate { low: i64, high: i64 },

    /// Record digest validation failed
    #[error("Invalid record digest: {reason}")]
    InvalidDigest { reason: String },

    /// The store rejected or failed a scan pass
    #[error("Scan execution failed: {message} (store code {code})")]
    Exec { code: i32, message: String },

    /// Partition status table does not match the cluster partition count
    #[error(
        "Partition table mismatch: table tracks {table_partitions} partitions, \
         cluster reports {cluster_partitions}"
    )]
    ProtocolViolation {
        cluster_partitions: usize,
        table_partitions: usize,
    },

    /// Configuration validation failed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Checkpoint data corruption detected
    #[error("Checkpoint corruption detected: {0}")]
    Corruption(String),
}

impl PartscanError {
    /// Create an invalid digest error
    pub fn invalid_digest(reason: impl Into<String>) -> Self {
        Self::InvalidDigest { reason: reason.into() }
    }

    /// Create an execution error carrying the store's native status code
    pub fn exec(code: i32, message: impl Into<String>) -> Self {
        Self::Exec {
            code,
            message: message.into(),
        }
    }

    /// Create a partition table mismatch error
    pub fn protocol_violation(cluster_partitions: usize, table_partitions: usize) -> Self {
        Self::ProtocolViolation {
            cluster_partitions,
            table_partitions,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a checkpoint corruption error
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption(message.into())
    }

    /// Check if this error is worth retrying with the same inputs
    ///
    /// Execution and IO failures are typically transient cluster or disk
    /// conditions. Validation and corruption errors are permanent until the
    /// caller changes its inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Exec { .. } | Self::Io(_))
    }

    /// Check if this error indicates invalid caller input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidPredicate { .. } | Self::InvalidDigest { .. } | Self::Config(_)
        )
    }

    /// The store's native status code, when one is attached
    pub fn store_code(&self) -> Option<i32> {
        match self {
            Self::Exec { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let error: PartscanError = io_error.into();
        assert!(matches!(error, PartscanError::Io(_)));
        assert!(error.to_string().contains("file missing"));
    }

    #[test]
    fn test_invalid_predicate_display() {
        let error = PartscanError::InvalidPredicate { low: 10, high: 3 };
        assert_eq!(
            error.to_string(),
            "Invalid predicate: lower bound 10 exceeds upper bound 3"
        );
    }

    #[test]
    fn test_exec_error_carries_code() {
        let error = PartscanError::exec(9, "timeout waiting for partition");
        assert_eq!(error.store_code(), Some(9));
        assert!(error.to_string().contains("store code 9"));
        assert!(error.to_string().contains("timeout waiting for partition"));
    }

    #[test]
    fn test_protocol_violation_display() {
        let error = PartscanError::protocol_violation(8192, 4096);
        let message = error.to_string();
        assert!(message.contains("4096"));
        assert!(message.contains("8192"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(PartscanError::exec(11, "cluster unstable").is_retryable());
        assert!(PartscanError::from(std::io::Error::other("disk")).is_retryable());
        assert!(!PartscanError::config("empty namespace").is_retryable());
        assert!(!PartscanError::corruption("bad magic").is_retryable());
        assert!(!PartscanError::protocol_violation(1, 2).is_retryable());
    }

    #[test]
    fn test_invalid_input_classification() {
        assert!(PartscanError::InvalidPredicate { low: 1, high: 0 }.is_invalid_input());
        assert!(PartscanError::invalid_digest("too short").is_invalid_input());
        assert!(PartscanError::config("bad").is_invalid_input());
        assert!(!PartscanError::exec(1, "server").is_invalid_input());
    }

    #[test]
    fn test_store_code_absent_for_other_variants() {
        assert_eq!(PartscanError::config("x").store_code(), None);
        assert_eq!(PartscanError::corruption("x").store_code(), None);
    }

    #[test]
    fn test_corruption_display() {
        let error = PartscanError::corruption("entry 3 partition id out of order");
        assert_eq!(
            error.to_string(),
            "Checkpoint corruption detected: entry 3 partition id out of order"
        );
    }
}
