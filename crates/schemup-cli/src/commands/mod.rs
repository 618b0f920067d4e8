pub mod apply;
pub mod plan;
pub mod status;
pub mod validate;

use clap::Args;
use schemup_store::SqliteConnection;
use std::path::PathBuf;
use std::time::Duration;

/// Database and migration directory shared by the commands that connect
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Path (or SQLite URI) of the database file
    #[arg(long, env = "SCHEMUP_DB")]
    pub db: PathBuf,

    /// Directory containing `<version>_<up|down>[-<description>].sql` files
    #[arg(long, env = "SCHEMUP_MIGRATIONS")]
    pub migrations: PathBuf,

    /// How long to wait for another transaction on the connection
    #[arg(long, env = "SCHEMUP_TRANSACTION_TIMEOUT_MS", default_value_t = 30_000)]
    pub transaction_timeout_ms: u64,
}

impl TargetArgs {
    pub fn connection(&self) -> SqliteConnection {
        SqliteConnection::new(&self.db)
            .with_transaction_timeout(Duration::from_millis(self.transaction_timeout_ms))
    }

    /// Connection for commands that only inspect the database
    pub fn read_only_connection(&self) -> SqliteConnection {
        self.connection().read_only()
    }
}

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
