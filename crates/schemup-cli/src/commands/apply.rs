//! Apply command
//!
//! Usage: schemup apply --db <PATH> --migrations <DIR> --target <VERSION> [--json]

use super::{CommandResult, TargetArgs};
use clap::Args;
use schemup_core::SchemaUpdater;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target_args: TargetArgs,

    /// Schema version to migrate to (must be at least 1)
    #[arg(long)]
    pub target: u32,

    /// Print the migration report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute apply command
pub fn execute(args: ApplyArgs) -> CommandResult {
    let connection = args.target_args.connection();
    let report = SchemaUpdater::new(&connection)
        .apply_migration_files(&args.target_args.migrations, args.target)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.applied.is_empty() {
        println!("Already at version {}, nothing to apply", report.to_version);
        return Ok(());
    }

    for applied in &report.applied {
        println!(
            "✓ Applied {} [{}] {}",
            applied.version,
            applied.direction,
            applied.file.display()
        );
    }
    println!(
        "Migrated from version {} to {} ({} files)",
        report.from_version,
        report.to_version,
        report.applied.len()
    );

    Ok(())
}
