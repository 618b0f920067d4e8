//! Database connection management
//!
//! A SQLite connection that can be shared by several owners. `open` and
//! `close` are reference counted and the handle is released when the last
//! owner closes. Only one transaction may be active at a time.

use crate::errors::{
    from_rusqlite, invalid_version, io_error, not_open, open_error, transaction_timeout, Result,
};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OpenFlags};
use schemup_core::database::DbResult;
use schemup_core::{Database, Transaction};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// How long `begin_transaction` waits for the active transaction to finish
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Reference-counted SQLite connection
pub struct SqliteConnection {
    path: PathBuf,
    handle: Mutex<Option<Connection>>,
    open_count: AtomicU32,
    transaction_lock: Mutex<()>,
    transaction_timeout: Duration,
    read_only: bool,
    last_error: Mutex<String>,
}

impl SqliteConnection {
    /// Create a closed connection for the database at `path`.
    ///
    /// `path` may be a SQLite URI such as `file::memory:?cache=shared`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: Mutex::new(None),
            open_count: AtomicU32::new(0),
            transaction_lock: Mutex::new(()),
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
            read_only: false,
            last_error: Mutex::new(String::new()),
        }
    }

    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Open without write access. The database file must already exist.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transaction_timeout(&self) -> Duration {
        self.transaction_timeout
    }

    /// Number of owners that currently hold the connection open
    pub fn open_count(&self) -> u32 {
        self.open_count.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.handle.lock().is_some()
    }

    fn is_in_memory(&self) -> bool {
        let path = self.path.to_string_lossy();
        path.contains(":memory:") || path.contains("mode=memory")
    }

    fn open_handle(&self) -> Result<Connection> {
        if self.read_only {
            return Connection::open_with_flags(
                &self.path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| open_error(&self.path, e));
        }

        if !self.is_in_memory() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| io_error("create_database_dir", parent, e))?;
                }
            }
        }

        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| open_error(&self.path, e))
    }

    /// Run `f` against the open handle, recording failures for `error_message`
    fn with_handle<T>(
        &self,
        op: &str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let handle = self.handle.lock();
        let conn = handle.as_ref().ok_or_else(|| not_open(op))?;
        f(conn).map_err(|e| {
            *self.last_error.lock() = e.to_string();
            from_rusqlite(op, e)
        })
    }

    /// True while a transaction started with `BEGIN` has not finished
    fn in_transaction(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|conn| !conn.is_autocommit())
    }

    fn close_internal(&self, force: bool) -> Result<()> {
        let mut handle = self.handle.lock();

        if force {
            self.open_count.store(0, Ordering::SeqCst);
        } else {
            match self
                .open_count
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            {
                Ok(1) => {}
                Ok(_) => {
                    tracing::debug!("Connection should remain open for other users");
                    return Ok(());
                }
                Err(_) => {
                    tracing::info!(path = %self.path.display(), "Database file is already closed");
                    return Ok(());
                }
            }
        }

        let Some(conn) = handle.take() else {
            tracing::info!(path = %self.path.display(), "Database file is already closed");
            return Ok(());
        };

        // rusqlite finalizes its cached statements before closing
        match conn.close() {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Successfully closed database");
                Ok(())
            }
            Err((conn, err)) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "Error closing database file"
                );
                *self.last_error.lock() = err.to_string();
                *handle = Some(conn);
                if !force {
                    self.open_count.fetch_add(1, Ordering::SeqCst);
                }
                Err(from_rusqlite("close", err))
            }
        }
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if let Err(err) = self.close_internal(true) {
            tracing::warn!(error = %err, "Could not close database on drop");
        }
    }
}

impl Database for SqliteConnection {
    fn open(&self) -> DbResult<()> {
        let mut handle = self.handle.lock();
        self.open_count.fetch_add(1, Ordering::SeqCst);

        // Trust the handle, not the counter: a nested open after a failed
        // first open must still try to connect
        if handle.is_some() {
            tracing::debug!("Connection already opened");
            return Ok(());
        }

        match self.open_handle() {
            Ok(conn) => {
                *handle = Some(conn);
                tracing::debug!(path = %self.path.display(), "Established connection to database");
                Ok(())
            }
            Err(err) => {
                self.open_count.fetch_sub(1, Ordering::SeqCst);
                *self.last_error.lock() = err.message().to_string();
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "Error opening database"
                );
                Err(err)
            }
        }
    }

    fn close(&self) -> DbResult<()> {
        self.close_internal(false)
    }

    fn execute(&self, sql: &str) -> DbResult<()> {
        self.with_handle("execute", |conn| conn.execute_batch(sql))
            .inspect_err(|err| {
                tracing::error!(statement = sql, error = %err, "Could not execute statement")
            })
    }

    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>> {
        let guard = self
            .transaction_lock
            .try_lock_for(self.transaction_timeout)
            .ok_or_else(|| transaction_timeout(self.transaction_timeout))?;

        self.execute("BEGIN TRANSACTION")?;

        Ok(Box::new(SqliteTransaction {
            connection: self,
            guard: Some(guard),
        }))
    }

    fn schema_version(&self) -> DbResult<u32> {
        let value: i64 = self.with_handle("schema_version", |conn| {
            conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        })?;
        u32::try_from(value).map_err(|_| invalid_version(value))
    }

    fn set_schema_version(&self, version: u32) -> DbResult<()> {
        self.execute(&format!("PRAGMA user_version = {}", version))
    }

    fn error_message(&self) -> String {
        self.last_error.lock().clone()
    }
}

/// Transaction on a [`SqliteConnection`]
///
/// Holds the connection's transaction lock. Dropping it without calling
/// `commit` or `rollback` rolls back.
pub struct SqliteTransaction<'c> {
    connection: &'c SqliteConnection,
    guard: Option<MutexGuard<'c, ()>>,
}

impl SqliteTransaction<'_> {
    fn finish(&mut self, statement: &str) -> Result<()> {
        let result = self.connection.execute(statement);
        self.guard.take();
        result
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn commit(mut self: Box<Self>) -> DbResult<()> {
        let result = self.connection.execute("COMMIT TRANSACTION");

        // A failed COMMIT can leave the transaction open
        if result.is_err() && self.connection.in_transaction() {
            if let Err(err) = self.connection.execute("ROLLBACK TRANSACTION") {
                tracing::warn!(error = %err, "Rollback after failed commit failed");
            }
        }

        self.guard.take();
        result
    }

    fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finish("ROLLBACK TRANSACTION")
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Rolling back unfinished transaction");
            if let Err(err) = self.finish("ROLLBACK TRANSACTION") {
                tracing::warn!(error = %err, "Could not roll back transaction");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_memory(name: &str) -> SqliteConnection {
        SqliteConnection::new(format!("file:{}?mode=memory&cache=shared", name))
    }

    #[test]
    fn test_execute_requires_open_connection() {
        let conn = shared_memory("db_not_open");
        let err = conn.execute("SELECT 1").unwrap_err();
        assert_eq!(err.kind(), schemup_core::ExErrorKind::NotOpen);
    }

    #[test]
    fn test_user_version_roundtrip() {
        let conn = shared_memory("db_user_version");
        conn.open().unwrap();
        assert_eq!(conn.schema_version().unwrap(), 0);
        conn.set_schema_version(7).unwrap();
        assert_eq!(conn.schema_version().unwrap(), 7);
        conn.close().unwrap();
    }

    #[test]
    fn test_in_memory_path_detection() {
        assert!(SqliteConnection::new(":memory:").is_in_memory());
        assert!(shared_memory("x").is_in_memory());
        assert!(!SqliteConnection::new("/tmp/store.db").is_in_memory());
    }
}
