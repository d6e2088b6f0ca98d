//! Redistribution commands

use allot_engine::RedistributionStatus;
use allot_types::AllocatorId;
use clap::Subcommand;

use super::LocalRegistry;
use crate::error::CliResult;
use crate::output::{amount, print_info, print_structured, print_success, print_warning, OutputFormat};

/// Redistribution subcommands
#[derive(Subcommand)]
pub enum RedistributeCommands {
    /// Recompute every allocator's contributions from scratch
    Full,

    /// Recompute only the given allocators
    Partial {
        /// Allocator IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Recompute allocators pending reallocation
    Pending,
}

/// Execute redistribution command
pub fn execute(command: RedistributeCommands, registry: &mut LocalRegistry, format: OutputFormat) -> CliResult<()> {
    let status = match command {
        RedistributeCommands::Full => registry.redistribute_full()?,
        RedistributeCommands::Partial { ids } => {
            let ids: Vec<AllocatorId> = ids.into_iter().map(AllocatorId).collect();
            registry.redistribute_partial(&ids)?
        }
        RedistributeCommands::Pending => registry.redistribute_pending()?,
    };

    if !print_structured(&status, format)? {
        print_status(&status);
    }
    Ok(())
}

fn print_status(status: &RedistributionStatus) {
    let Some(outcome) = status.outcome() else {
        print_info(&status.to_string());
        return;
    };
    if outcome.unknown_ids.is_empty() {
        print_success(&status.to_string());
    } else {
        print_warning(&status.to_string());
    }
    println!(
        "  committed {} (intentions {}, free funds {})",
        amount(outcome.total_committed()),
        amount(outcome.committed.from_intentions),
        amount(outcome.committed.from_free),
    );
}
