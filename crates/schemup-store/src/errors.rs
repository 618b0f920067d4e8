//! Error handling for schemup-store
//!
//! Wraps schemup-core ExError with store-specific helpers

use schemup_core::errors::{ExError, ExErrorKind};
use std::path::Path;
use std::time::Duration;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Create an open error for the database at `path`
pub fn open_error(path: &Path, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::OpenFailed)
        .with_op("open")
        .with_file(path)
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_file(path)
        .with_message(err.to_string())
}

/// Operation attempted on a closed connection
pub fn not_open(operation: &str) -> ExError {
    ExError::new(ExErrorKind::NotOpen)
        .with_op(operation.to_string())
        .with_message("Database connection is not open")
}

/// Waited too long for the active transaction to finish
pub fn transaction_timeout(waited: Duration) -> ExError {
    ExError::new(ExErrorKind::Timeout)
        .with_op("begin_transaction")
        .with_message(format!(
            "Another transaction is still active after waiting {} ms",
            waited.as_millis()
        ))
}

/// Stored schema version does not fit a u32
pub fn invalid_version(value: i64) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("schema_version")
        .with_message(format!("Invalid user_version in database: {}", value))
}
