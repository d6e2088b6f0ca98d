//! Output formatting utilities

use colored::*;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a list of rows in the specified format
pub fn print_rows<T: Serialize + Tabled>(rows: Vec<T>, format: OutputFormat, empty: &str) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", empty.dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&rows)?),
    }
    Ok(())
}

/// Print a single value as JSON or YAML. Returns false in table mode so the
/// caller can render its own view.
pub fn print_structured<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> CliResult<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
            Ok(true)
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Format an amount for table cells.
pub fn amount(value: f64) -> String {
    allot_report::format_amount(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_output_format_from_toml_value() {
        #[derive(Deserialize)]
        struct Holder {
            format: OutputFormat,
        }
        let holder: Holder = toml::from_str("format = \"yaml\"").unwrap();
        assert_eq!(holder.format, OutputFormat::Yaml);
    }
}
