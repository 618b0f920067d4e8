#![allow(dead_code)]

use schemup_core::database::DbResult;
use schemup_core::{Database, ExError, ExErrorKind, Transaction};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write a complete migration chain `1_up .. max_version` into a temp dir.
///
/// Each up file records `up <v>` and each down file `down <v>` so a fake
/// database can report exactly what ran.
pub fn migration_dir(max_version: u32) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp migration directory");
    write_file(dir.path(), "1_up-initial.sql", "up 1");
    for v in 2..=max_version {
        write_file(dir.path(), &format!("{v}_up.sql"), &format!("up {v}"));
        write_file(dir.path(), &format!("{v}_down.sql"), &format!("down {v}"));
    }
    dir
}

pub fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("Failed to write migration file");
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub open_count: u32,
    pub calls: Vec<&'static str>,
    pub committed: Vec<String>,
    pub pending: Vec<String>,
    pub version: u32,
    pub pending_version: Option<u32>,
    pub in_transaction: bool,
    pub commits: u32,
    pub rollbacks: u32,
    pub fail_open: bool,
    pub fail_version_read: bool,
    pub fail_begin: bool,
    pub fail_commit: bool,
    pub fail_close: bool,
    pub last_error: String,
}

/// In-memory stand-in for the SQLite collaborator.
///
/// Any statement containing `FAIL` fails. Statements run inside a
/// transaction only become visible in `committed` after commit.
#[derive(Debug, Default)]
pub struct FakeDatabase {
    pub state: RefCell<FakeState>,
}

impl FakeDatabase {
    pub fn at_version(version: u32) -> Self {
        let db = Self::default();
        db.state.borrow_mut().version = version;
        db
    }

    pub fn committed(&self) -> Vec<String> {
        self.state.borrow().committed.clone()
    }

    pub fn version(&self) -> u32 {
        self.state.borrow().version
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    fn fail(&self, op: &str, message: &str) -> ExError {
        self.state.borrow_mut().last_error = message.to_string();
        ExError::new(ExErrorKind::Persistence)
            .with_op(op.to_string())
            .with_message(message.to_string())
    }
}

pub struct FakeTransaction<'a> {
    db: &'a FakeDatabase,
    finished: bool,
}

impl FakeTransaction<'_> {
    fn discard(&mut self) {
        let mut state = self.db.state.borrow_mut();
        state.pending.clear();
        state.pending_version = None;
        state.in_transaction = false;
        state.rollbacks += 1;
        self.finished = true;
    }
}

impl Transaction for FakeTransaction<'_> {
    fn commit(mut self: Box<Self>) -> DbResult<()> {
        if self.db.state.borrow().fail_commit {
            self.discard();
            return Err(self.db.fail("commit", "database is locked"));
        }
        let mut state = self.db.state.borrow_mut();
        let pending = std::mem::take(&mut state.pending);
        state.committed.extend(pending);
        if let Some(version) = state.pending_version.take() {
            state.version = version;
        }
        state.in_transaction = false;
        state.commits += 1;
        drop(state);
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.discard();
        Ok(())
    }
}

impl Drop for FakeTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.discard();
        }
    }
}

impl Database for FakeDatabase {
    fn open(&self) -> DbResult<()> {
        self.state.borrow_mut().calls.push("open");
        if self.state.borrow().fail_open {
            return Err(self.fail("open", "unable to open database file"));
        }
        self.state.borrow_mut().open_count += 1;
        Ok(())
    }

    fn close(&self) -> DbResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push("close");
        state.open_count = state.open_count.saturating_sub(1);
        let fail_close = state.fail_close;
        drop(state);
        if fail_close {
            return Err(self.fail("close", "unable to close due to unfinalized statements"));
        }
        Ok(())
    }

    fn execute(&self, sql: &str) -> DbResult<()> {
        self.state.borrow_mut().calls.push("execute");
        if sql.contains("FAIL") {
            return Err(self.fail("execute", "near \"FAIL\": syntax error"));
        }
        let mut state = self.state.borrow_mut();
        if state.in_transaction {
            state.pending.push(sql.to_string());
        } else {
            state.committed.push(sql.to_string());
        }
        Ok(())
    }

    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>> {
        self.state.borrow_mut().calls.push("begin_transaction");
        if self.state.borrow().fail_begin {
            return Err(ExError::new(ExErrorKind::Timeout).with_op("begin_transaction"));
        }
        self.state.borrow_mut().in_transaction = true;
        Ok(Box::new(FakeTransaction {
            db: self,
            finished: false,
        }))
    }

    fn schema_version(&self) -> DbResult<u32> {
        self.state.borrow_mut().calls.push("schema_version");
        if self.state.borrow().fail_version_read {
            return Err(self.fail("schema_version", "no such pragma"));
        }
        Ok(self.state.borrow().version)
    }

    fn set_schema_version(&self, version: u32) -> DbResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_schema_version");
        if state.in_transaction {
            state.pending_version = Some(version);
        } else {
            state.version = version;
        }
        Ok(())
    }

    fn error_message(&self) -> String {
        self.state.borrow().last_error.clone()
    }
}
