//! Validate command
//!
//! Usage: schemup validate --migrations <DIR> [--max-version <VERSION>]

use super::CommandResult;
use clap::Args;
use schemup_core::migration::{scan, validate};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Directory containing the migration files
    #[arg(long, env = "SCHEMUP_MIGRATIONS")]
    pub migrations: PathBuf,

    /// Highest version that must be reachable (defaults to the highest found)
    #[arg(long)]
    pub max_version: Option<u32>,
}

/// Execute validate command
pub fn execute(args: ValidateArgs) -> CommandResult {
    let mut files = scan(&args.migrations)?;

    let max_version = match args.max_version {
        Some(version) => version,
        None => files
            .iter()
            .map(|d| d.version())
            .max()
            .ok_or("No migration files found")?,
    };
    if max_version == 0 {
        return Err("--max-version must be at least 1".into());
    }

    validate(&mut files, max_version)?;

    println!(
        "✓ {} migration files valid up to version {}",
        files.len(),
        max_version
    );
    Ok(())
}
