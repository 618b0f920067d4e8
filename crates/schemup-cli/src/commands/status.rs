//! Status command
//!
//! Usage: schemup status --db <PATH> --migrations <DIR>

use super::{CommandResult, TargetArgs};
use clap::Args;
use schemup_core::migration::scan;
use schemup_core::SchemaUpdater;

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target_args: TargetArgs,
}

/// Execute status command
pub fn execute(args: StatusArgs) -> CommandResult {
    let connection = args.target_args.read_only_connection();
    let current = SchemaUpdater::new(&connection).current_version()?;
    let latest = scan(&args.target_args.migrations)?
        .iter()
        .map(|d| d.version())
        .max()
        .unwrap_or(0);

    println!("Current version: {}", current);
    println!("Latest available: {}", latest);
    match current.cmp(&latest) {
        std::cmp::Ordering::Equal => println!("Up to date"),
        std::cmp::Ordering::Less => println!("{} version(s) pending", latest - current),
        std::cmp::Ordering::Greater => {
            println!("Database is ahead of the migration directory")
        }
    }

    Ok(())
}
