//! schemup Store - SQLite collaborator for the migration engine
//!
//! Provides:
//! - A reference-counted SQLite connection implementing `Database`
//! - Transactions that roll back unless committed
//! - A one-call entry point for bringing a database file to a target version

pub mod db;
pub mod errors;
pub mod migrations;

// Re-export key types
pub use db::{SqliteConnection, SqliteTransaction, DEFAULT_TRANSACTION_TIMEOUT};
pub use errors::Result;
pub use migrations::apply_migration_files;
