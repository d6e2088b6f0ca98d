//! Allot CLI - Command-line interface for budget allocation
//!
//! This CLI gives operators a terminal interface to:
//! - Register allocators with budgets, intentions and preference scores
//! - Register targets and categories
//! - Run full, partial or pending redistributions
//! - Print funding reports and check the contribution ledger

use std::ffi::OsString;
use std::path::PathBuf;

use allot_registry::Registry;
use allot_store::JsonFileStore;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{allocator, category, check, redistribute, report, target};
use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::{print_error, OutputFormat};

/// Allot CLI application
#[derive(Parser)]
#[command(name = "allot")]
#[command(about = "Allot - greedy budget allocation across funding targets", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the JSON collections
    #[arg(short, long, env = "ALLOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Manage allocators
    Allocator {
        #[command(subcommand)]
        command: allocator::AllocatorCommands,
    },

    /// Manage targets
    Target {
        #[command(subcommand)]
        command: target::TargetCommands,
    },

    /// Manage the category list
    Category {
        #[command(subcommand)]
        command: category::CategoryCommands,
    },

    /// Recompute contributions
    #[command(alias = "run")]
    Redistribute {
        #[command(subcommand)]
        command: redistribute::RedistributeCommands,
    },

    /// Print the funding report
    Report {
        #[command(subcommand)]
        command: Option<report::ReportCommands>,
    },

    /// Verify ledger consistency
    Check,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing on stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    // Load config
    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.output.or(config.default_output).unwrap_or_default();
    let data_dir = config.resolve_data_dir(cli.data_dir)?;
    debug!(data_dir = %data_dir.display(), ?format, "Opening registry");

    let mut registry = Registry::load(JsonFileStore::new(data_dir))?;

    // Execute command
    match cli.command {
        Commands::Allocator { command } => allocator::execute(command, &mut registry, format),
        Commands::Target { command } => target::execute(command, &mut registry, format),
        Commands::Category { command } => category::execute(command, &mut registry, format),
        Commands::Redistribute { command } => redistribute::execute(command, &mut registry, format),
        Commands::Report { command } => report::execute(command, &registry, format),
        Commands::Check => check::execute(&registry, format),
    }
}
