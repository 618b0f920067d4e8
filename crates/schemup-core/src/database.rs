//! Database collaborator interface
//!
//! The migration runner only needs a handful of operations from the
//! underlying SQL engine. `schemup-store` implements them over SQLite.

use crate::errors::ExError;

/// Result type for collaborator operations
pub type DbResult<T> = std::result::Result<T, ExError>;

/// An open transaction.
///
/// Holds the connection's transaction lock until `commit` or `rollback` is
/// called. Implementations must roll back when dropped without either.
pub trait Transaction {
    /// Commit the transaction and release the lock
    fn commit(self: Box<Self>) -> DbResult<()>;

    /// Abort the transaction and release the lock
    fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// Connection operations consumed by [`crate::SchemaUpdater`]
pub trait Database {
    /// Open the connection. Nested opens are reference counted.
    fn open(&self) -> DbResult<()>;

    /// Release one reference; the handle closes when the count reaches zero.
    fn close(&self) -> DbResult<()>;

    /// Execute `sql` as a statement batch
    fn execute(&self, sql: &str) -> DbResult<()>;

    /// Start a transaction.
    ///
    /// Blocks while another transaction is active, up to an implementation
    /// defined timeout.
    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>>;

    /// Read the persisted schema version
    fn schema_version(&self) -> DbResult<u32>;

    /// Persist `version` as the schema version
    fn set_schema_version(&self, version: u32) -> DbResult<()>;

    /// Most recent error reported by the engine
    fn error_message(&self) -> String;
}
