//! Error types for minirel
//!
//! This module defines all error types used throughout the execution engine.

use thiserror::Error;

/// The main error type for minirel
#[derive(Error, Debug)]
pub enum Error {
    // ========== Name Resolution Errors ==========
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("unknown column '{0}' in table '{1}'")]
    UnknownColumn(String, String),

    #[error("unknown index '{0}' on table '{1}'")]
    UnknownIndex(String, String),

    // ========== Schema Errors ==========
    #[error("cannot drop a schema table '{0}'")]
    SchemaProtected(String),

    #[error("unsupported data type {0}")]
    UnsupportedType(String),

    #[error("type mismatch for column '{column}': expected {expected}")]
    TypeMismatch { column: String, expected: String },

    // ========== Statement Errors ==========
    #[error("unsupported predicate: {0}")]
    UnsupportedPredicate(String),

    #[error("unsupported insert: {0}")]
    UnsupportedInsert(String),

    // ========== Storage Errors ==========
    #[error("storage error: {0}")]
    StorageError(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for minirel operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTable("users".to_string());
        assert_eq!(err.to_string(), "unknown table 'users'");

        let err = Error::SchemaProtected("_tables".to_string());
        assert_eq!(err.to_string(), "cannot drop a schema table '_tables'");

        let err = Error::TypeMismatch {
            column: "id".to_string(),
            expected: "INT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for column 'id': expected INT"
        );
    }
}
