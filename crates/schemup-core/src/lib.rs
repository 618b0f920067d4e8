//! schemup Core - migration discovery, validation and sequencing
//!
//! This crate provides the engine that brings an embedded database to a
//! target schema version:
//! - Migration file scanning and filename parsing
//! - Strict up/down pairing validation
//! - Direction selection and range sequencing
//! - The `SchemaUpdater` runner driving a `Database` collaborator
//! - Error and logging facilities shared with the store and CLI

pub mod database;
pub mod errors;
pub mod logging_facility;
pub mod migration;
pub mod schema_updater;

// Re-export commonly used types
pub use database::{Database, Transaction};
pub use errors::{ExError, ExErrorKind, MigrationError, Result, SequenceError};
pub use migration::{Direction, MigrationDescriptor};
pub use schema_updater::{AppliedMigration, MigrationReport, SchemaUpdater};
