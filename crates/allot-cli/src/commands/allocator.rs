//! Allocator commands

use std::collections::BTreeMap;

use allot_registry::AllocatorUpdate;
use allot_report::AllocatorDetail;
use allot_types::{Allocator, AllocatorId, CategoryIntention};
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use super::{hint_pending, parse_assignment, LocalRegistry};
use crate::error::{CliError, CliResult};
use crate::output::{amount, print_rows, print_structured, print_success, OutputFormat};

/// Allocator subcommands
#[derive(Subcommand)]
pub enum AllocatorCommands {
    /// Register a new allocator
    Add {
        /// Display name
        name: String,

        /// Total budget
        #[arg(allow_hyphen_values = true)]
        budget: f64,

        /// Free-text profile
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// List allocators
    List {
        /// Show only allocators pending reallocation
        #[arg(short, long)]
        pending: bool,
    },

    /// Show one allocator with its contributions and chart data
    Show {
        /// Allocator ID
        id: u64,
    },

    /// Update name, budget or profile
    Update {
        /// Allocator ID
        id: u64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        budget: Option<f64>,

        #[arg(short, long, conflicts_with = "clear_profile")]
        profile: Option<String>,

        /// Remove the profile
        #[arg(long)]
        clear_profile: bool,
    },

    /// Replace category intentions (in the order given)
    Intentions {
        /// Allocator ID
        id: u64,

        /// CATEGORY=AMOUNT, repeatable; omit to clear
        #[arg(short, long = "set", value_parser = parse_assignment::<f64>)]
        set: Vec<(String, f64)>,
    },

    /// Replace preference scores
    Preferences {
        /// Allocator ID
        id: u64,

        /// CATEGORY=SCORE, repeatable; omit to clear
        #[arg(short, long = "set", value_parser = parse_assignment::<u32>)]
        set: Vec<(String, u32)>,
    },

    /// Delete an allocator and withdraw its contributions
    Delete {
        /// Allocator ID
        id: u64,
    },
}

/// Table row for allocator display
#[derive(Debug, Serialize, Tabled)]
struct AllocatorRow {
    id: u64,
    name: String,
    budget: String,
    intended: String,
    free: String,
    spent: String,
    remaining: String,
    pending: String,
}

impl From<&Allocator> for AllocatorRow {
    fn from(a: &Allocator) -> Self {
        Self {
            id: a.id.0,
            name: a.name.clone(),
            budget: amount(a.total_budget),
            intended: amount(a.intended_total()),
            free: amount(a.free_budget()),
            spent: amount(a.actual_spent),
            remaining: amount(a.remaining_budget()),
            pending: if a.needs_reallocation { "yes" } else { "no" }.to_string(),
        }
    }
}

/// Execute allocator command
pub fn execute(command: AllocatorCommands, registry: &mut LocalRegistry, format: OutputFormat) -> CliResult<()> {
    match command {
        AllocatorCommands::Add { name, budget, profile } => {
            let allocator = registry.add_allocator(&name, budget, profile)?.clone();
            if !print_structured(&allocator, format)? {
                print_success(&format!(
                    "Allocator '{}' added with ID {}",
                    allocator.name, allocator.id
                ));
                hint_pending(registry);
            }
            Ok(())
        }
        AllocatorCommands::List { pending } => {
            let rows: Vec<AllocatorRow> = registry
                .allocators()
                .iter()
                .filter(|a| !pending || a.needs_reallocation)
                .map(AllocatorRow::from)
                .collect();
            print_rows(rows, format, "No allocators found.")
        }
        AllocatorCommands::Show { id } => show(registry, AllocatorId(id), format),
        AllocatorCommands::Update {
            id,
            name,
            budget,
            profile,
            clear_profile,
        } => {
            let profile = if clear_profile { Some(None) } else { profile.map(Some) };
            let update = AllocatorUpdate {
                name,
                total_budget: budget,
                profile,
            };
            if update == AllocatorUpdate::default() {
                return Err(CliError::InvalidArgument(
                    "nothing to update; pass --name, --budget, --profile or --clear-profile".into(),
                ));
            }
            registry.update_allocator(AllocatorId(id), update)?;
            after_change(registry, AllocatorId(id), format, "updated")
        }
        AllocatorCommands::Intentions { id, set } => {
            let intentions = set
                .into_iter()
                .map(|(category, value)| CategoryIntention::new(category.as_str(), value))
                .collect();
            registry.set_intentions(AllocatorId(id), intentions)?;
            after_change(registry, AllocatorId(id), format, "intentions updated")
        }
        AllocatorCommands::Preferences { id, set } => {
            let mut scores = BTreeMap::new();
            for (category, score) in set {
                if scores.insert(category.clone(), score).is_some() {
                    return Err(CliError::InvalidArgument(format!(
                        "preference for '{}' given twice",
                        category
                    )));
                }
            }
            registry.set_preferences(AllocatorId(id), scores)?;
            after_change(registry, AllocatorId(id), format, "preferences updated")
        }
        AllocatorCommands::Delete { id } => {
            let removed = registry.delete_allocator(AllocatorId(id))?;
            if !print_structured(&removed, format)? {
                print_success(&format!("Allocator '{}' (ID {}) deleted", removed.name, removed.id));
                hint_pending(registry);
            }
            Ok(())
        }
    }
}

fn after_change(registry: &LocalRegistry, id: AllocatorId, format: OutputFormat, what: &str) -> CliResult<()> {
    let allocator = lookup(registry, id)?;
    if !print_structured(allocator, format)? {
        print_success(&format!("Allocator '{}' {}", allocator.name, what));
        hint_pending(registry);
    }
    Ok(())
}

fn lookup(registry: &LocalRegistry, id: AllocatorId) -> CliResult<&Allocator> {
    registry
        .allocator(id)
        .ok_or_else(|| CliError::NotFound(format!("allocator {}", id)))
}

fn show(registry: &LocalRegistry, id: AllocatorId, format: OutputFormat) -> CliResult<()> {
    let allocator = lookup(registry, id)?;
    let detail = AllocatorDetail::build(allocator, registry.targets());
    if !print_structured(&detail, format)? {
        print!("{}", detail);
    }
    Ok(())
}
