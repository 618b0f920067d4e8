//! Plan command
//!
//! Usage: schemup plan --db <PATH> --migrations <DIR> --target <VERSION>

use super::{CommandResult, TargetArgs};
use clap::Args;
use schemup_core::migration::compute_checksum;
use schemup_core::SchemaUpdater;

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target_args: TargetArgs,

    /// Schema version to plan for (must be at least 1)
    #[arg(long)]
    pub target: u32,
}

/// Execute plan command
pub fn execute(args: PlanArgs) -> CommandResult {
    let connection = args.target_args.read_only_connection();
    let files =
        SchemaUpdater::new(&connection).plan(&args.target_args.migrations, args.target)?;

    if files.is_empty() {
        println!("Nothing to apply");
        return Ok(());
    }

    for file in &files {
        let checksum = compute_checksum(&file.read_sql()?);
        println!(
            "{:>6} {:<4} {}  sha256:{}",
            file.version(),
            file.direction(),
            file.file_name(),
            &checksum[..12]
        );
    }

    Ok(())
}
