//! Schema updater
//!
//! Brings a database to a target schema version by applying migration files
//! inside a single transaction. Either every file and the new version are
//! committed together, or nothing is.

use crate::database::Database;
use crate::errors::{MigrationError, Result};
use crate::migration::{compute_checksum, plan, Direction, MigrationDescriptor};
use crate::{log_op_end, log_op_error, log_op_start};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

const OP_APPLY: &str = "apply_migration_files";

/// A migration file executed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub file: PathBuf,
    pub version: u32,
    pub direction: Direction,
    /// SHA256 of the executed SQL text
    pub checksum: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// `None` when the database was already at the target version
    pub direction: Option<Direction>,
    pub applied: Vec<AppliedMigration>,
}

impl MigrationReport {
    fn unchanged(version: u32) -> Self {
        Self {
            from_version: version,
            to_version: version,
            direction: None,
            applied: Vec::new(),
        }
    }
}

fn check_preconditions(migration_directory: &Path, target_version: u32) -> Result<()> {
    if target_version == 0 {
        return Err(MigrationError::InvalidTarget);
    }

    if !migration_directory.is_dir() {
        return Err(MigrationError::DirectoryNotFound {
            path: migration_directory.to_path_buf(),
        });
    }

    Ok(())
}

/// Applies migration files through a [`Database`] collaborator
pub struct SchemaUpdater<'a> {
    database: &'a dyn Database,
}

impl<'a> SchemaUpdater<'a> {
    pub fn new(database: &'a dyn Database) -> Self {
        Self { database }
    }

    /// Apply migration files, reporting only success or failure.
    ///
    /// Failures are logged; the database is not modified when this returns
    /// `false`.
    pub fn apply(&self, migration_directory: &Path, target_version: u32) -> bool {
        self.apply_migration_files(migration_directory, target_version)
            .is_ok()
    }

    /// Apply the migration files in `migration_directory` needed to reach
    /// `target_version`.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the run. Nothing is committed unless the
    /// whole batch and the new version were written.
    pub fn apply_migration_files(
        &self,
        migration_directory: &Path,
        target_version: u32,
    ) -> Result<MigrationReport> {
        let started = Instant::now();
        log_op_start!(
            OP_APPLY,
            target_version = target_version,
            migration_directory = %migration_directory.display()
        );

        let result = self.run(migration_directory, target_version);

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(report) => {
                log_op_end!(
                    OP_APPLY,
                    duration_ms = duration_ms,
                    current_version = report.from_version,
                    target_version = report.to_version,
                    file_count = report.applied.len()
                );
            }
            Err(err) => log_op_error!(OP_APPLY, err.clone(), duration_ms = duration_ms),
        }

        result
    }

    /// Read the schema version currently stored in the database
    pub fn current_version(&self) -> Result<u32> {
        self.with_connection(Ok)
    }

    /// Files that a run to `target_version` would apply, in order.
    ///
    /// Reads the current version but executes no SQL.
    pub fn plan(
        &self,
        migration_directory: &Path,
        target_version: u32,
    ) -> Result<Vec<MigrationDescriptor>> {
        check_preconditions(migration_directory, target_version)?;
        self.with_connection(|current| plan(migration_directory, current, target_version))
    }

    fn run(&self, migration_directory: &Path, target_version: u32) -> Result<MigrationReport> {
        check_preconditions(migration_directory, target_version)?;
        self.with_connection(|current| self.migrate(migration_directory, current, target_version))
    }

    /// Open the connection, read the current version and hand it to `f`.
    ///
    /// The connection is closed on every path once opened; close failures
    /// are only logged.
    fn with_connection<T>(&self, f: impl FnOnce(u32) -> Result<T>) -> Result<T> {
        self.database
            .open()
            .map_err(|e| MigrationError::OpenFailed {
                reason: e.to_string(),
            })?;

        let result = self
            .database
            .schema_version()
            .map_err(|e| MigrationError::OpenFailed {
                reason: e.to_string(),
            })
            .and_then(f);

        if let Err(err) = self.database.close() {
            tracing::warn!(error = %err, "Could not close database");
        }

        result
    }

    fn migrate(
        &self,
        migration_directory: &Path,
        current_version: u32,
        target_version: u32,
    ) -> Result<MigrationReport> {
        tracing::info!(
            current_version,
            target_version,
            "Target version: {}, current version: {}",
            target_version,
            current_version
        );

        let Some(direction) = Direction::between(current_version, target_version) else {
            tracing::info!("No migrations to apply since versions match");
            return Ok(MigrationReport::unchanged(current_version));
        };

        let files = plan(migration_directory, current_version, target_version)
            .inspect_err(|err| tracing::error!(error = %err, "No actions performed"))?;

        // Dropping the transaction on any early return rolls it back
        let transaction = self
            .database
            .begin_transaction()
            .map_err(|e| MigrationError::Transaction {
                reason: e.to_string(),
            })?;

        let mut applied = Vec::with_capacity(files.len());
        for file in &files {
            let apply_failed = |reason: String| {
                tracing::error!(
                    migration_file = %file.file_location().display(),
                    "Could not apply migration file"
                );
                MigrationError::MigrationApplyFailed {
                    file: file.file_location().to_path_buf(),
                    reason,
                }
            };

            let sql = file.read_sql().map_err(|e| apply_failed(e.to_string()))?;
            self.database
                .execute(&sql)
                .map_err(|e| apply_failed(e.to_string()))?;

            tracing::debug!(
                migration_version = file.version(),
                direction = %file.direction(),
                "Applied {}",
                file.file_name()
            );
            applied.push(AppliedMigration {
                file: file.file_location().to_path_buf(),
                version: file.version(),
                direction: file.direction(),
                checksum: compute_checksum(&sql),
            });
        }

        self.database
            .set_schema_version(target_version)
            .map_err(|e| MigrationError::Transaction {
                reason: e.to_string(),
            })?;

        transaction
            .commit()
            .map_err(|e| MigrationError::CommitFailed {
                reason: e.to_string(),
            })?;

        Ok(MigrationReport {
            from_version: current_version,
            to_version: target_version,
            direction: Some(direction),
            applied,
        })
    }
}
