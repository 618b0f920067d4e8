//! schemup CLI
//!
//! Command-line interface for migrating SQLite databases

use clap::{Parser, Subcommand, ValueEnum};
use schemup_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "schemup")]
#[command(about = "schemup - Versioned schema migrations for SQLite", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, env = "SCHEMUP_LOG_FORMAT", default_value = "human")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Migrate the database to a target schema version
    Apply(commands::apply::ApplyArgs),
    /// Show the current and latest available schema versions
    Status(commands::status::StatusArgs),
    /// List the migration files a run would apply
    Plan(commands::plan::PlanArgs),
    /// Check the migration directory for gaps and broken pairs
    Validate(commands::validate::ValidateArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Apply(args) => commands::apply::execute(args),
        Commands::Status(args) => commands::status::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
