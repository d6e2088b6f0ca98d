//! Category commands

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use super::LocalRegistry;
use crate::error::CliResult;
use crate::output::{print_rows, print_structured, print_success, OutputFormat};

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Category name (normalized to "Capitalized" form)
        name: String,
    },

    /// List categories with their target counts
    List,

    /// Remove a category no allocator or target refers to
    Delete {
        /// Category name
        name: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    name: String,
    targets: usize,
    in_use: String,
}

/// Execute category command
pub fn execute(command: CategoryCommands, registry: &mut LocalRegistry, format: OutputFormat) -> CliResult<()> {
    match command {
        CategoryCommands::Add { name } => {
            let category = registry.add_category(&name)?;
            if !print_structured(&category, format)? {
                print_success(&format!("Category '{}' added", category));
            }
            Ok(())
        }
        CategoryCommands::List => {
            let rows: Vec<CategoryRow> = registry
                .categories()
                .iter()
                .map(|c| CategoryRow {
                    name: c.to_string(),
                    targets: registry.targets().iter().filter(|t| &t.category == c).count(),
                    in_use: if registry.category_usage(c).is_some() { "yes" } else { "no" }.to_string(),
                })
                .collect();
            print_rows(rows, format, "No categories found.")
        }
        CategoryCommands::Delete { name } => {
            let removed = registry.delete_category(&name)?;
            if !print_structured(&removed, format)? {
                print_success(&format!("Category '{}' deleted", removed));
            }
            Ok(())
        }
    }
}
