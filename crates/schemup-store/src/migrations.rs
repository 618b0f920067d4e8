//! Migration entry points backed by SQLite

use crate::db::SqliteConnection;
use schemup_core::{MigrationReport, SchemaUpdater};
use std::path::Path;

/// Bring the SQLite database at `database_path` to `target_version` using
/// the migration files in `migration_directory`.
///
/// Intended for process startup, before other components touch the database.
///
/// # Errors
///
/// Returns the run's failure; the database is left at its prior committed
/// version.
pub fn apply_migration_files(
    database_path: &Path,
    migration_directory: &Path,
    target_version: u32,
) -> schemup_core::Result<MigrationReport> {
    let connection = SqliteConnection::new(database_path);
    SchemaUpdater::new(&connection).apply_migration_files(migration_directory, target_version)
}
