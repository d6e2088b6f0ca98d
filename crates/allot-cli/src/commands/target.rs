//! Target commands

use allot_types::{FundingStatus, Target, TargetId};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use super::{hint_pending, LocalRegistry};
use crate::error::CliResult;
use crate::output::{amount, print_rows, print_structured, print_success, OutputFormat};

/// Target subcommands
#[derive(Subcommand)]
pub enum TargetCommands {
    /// Register a new target
    Add {
        /// Description
        description: String,

        /// Amount required to fully fund the target
        #[arg(allow_hyphen_values = true)]
        required: f64,

        /// Category the target belongs to
        #[arg(short, long, default_value = "Uncategorized")]
        category: String,
    },

    /// List targets
    List {
        /// Filter by funding status
        #[arg(short, long)]
        status: Option<StatusFilter>,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete a target
    Delete {
        /// Target ID
        id: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Funded,
    Partial,
    Unfunded,
}

impl StatusFilter {
    fn matches(self, status: FundingStatus) -> bool {
        matches!(
            (self, status),
            (StatusFilter::Funded, FundingStatus::Funded)
                | (StatusFilter::Partial, FundingStatus::PartiallyFunded)
                | (StatusFilter::Unfunded, FundingStatus::Unfunded)
        )
    }
}

/// Table row for target display
#[derive(Debug, Serialize, Tabled)]
struct TargetRow {
    id: u64,
    description: String,
    category: String,
    required: String,
    funded: String,
    missing: String,
    status: String,
    contributors: usize,
}

impl From<&Target> for TargetRow {
    fn from(t: &Target) -> Self {
        Self {
            id: t.id.0,
            description: t.description.clone(),
            category: t.category.to_string(),
            required: amount(t.required_amount),
            funded: amount(t.funded_amount.min(t.required_amount)),
            missing: amount(t.remaining_need()),
            status: format_status(t.funding_status()),
            contributors: t.contributions.len(),
        }
    }
}

fn format_status(status: FundingStatus) -> String {
    match status {
        FundingStatus::Funded => "✓ funded".to_string(),
        FundingStatus::PartiallyFunded => "◐ partially funded".to_string(),
        FundingStatus::Unfunded => "✗ unfunded".to_string(),
    }
}

/// Execute target command
pub fn execute(command: TargetCommands, registry: &mut LocalRegistry, format: OutputFormat) -> CliResult<()> {
    match command {
        TargetCommands::Add {
            description,
            required,
            category,
        } => {
            let target = registry.add_target(&description, required, &category)?.clone();
            if !print_structured(&target, format)? {
                print_success(&format!(
                    "Target '{}' added with ID {} ({})",
                    target.description, target.id, target.category
                ));
                hint_pending(registry);
            }
            Ok(())
        }
        TargetCommands::List { status, category } => {
            let category = category.map(|c| allot_types::Category::normalized(&c));
            let rows: Vec<TargetRow> = registry
                .targets()
                .iter()
                .filter(|t| status.map_or(true, |s| s.matches(t.funding_status())))
                .filter(|t| category.as_ref().map_or(true, |c| &t.category == c))
                .map(TargetRow::from)
                .collect();
            print_rows(rows, format, "No targets found.")
        }
        TargetCommands::Delete { id } => {
            let removed = registry.delete_target(TargetId(id))?;
            if !print_structured(&removed, format)? {
                print_success(&format!(
                    "Target '{}' (ID {}) deleted",
                    removed.description, removed.id
                ));
                hint_pending(registry);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        assert!(StatusFilter::Partial.matches(FundingStatus::PartiallyFunded));
        assert!(!StatusFilter::Funded.matches(FundingStatus::Unfunded));
    }
}
