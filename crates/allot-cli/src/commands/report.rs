//! Report commands

use allot_report::{render_text, FundingReport, PieChart};
use clap::Subcommand;
use colored::Colorize;

use super::LocalRegistry;
use crate::error::CliResult;
use crate::output::{amount, print_structured, OutputFormat};

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Used versus remaining budget, as chart data
    Chart,
}

/// Execute report command
pub fn execute(command: Option<ReportCommands>, registry: &LocalRegistry, format: OutputFormat) -> CliResult<()> {
    let report = FundingReport::build(registry.allocators(), registry.targets());
    if registry.allocators().iter().any(|a| a.needs_reallocation) && format == OutputFormat::Table {
        eprintln!(
            "{} some allocators are pending reallocation; figures may be stale",
            "⚠".yellow()
        );
    }

    match command {
        None => {
            if !print_structured(&report, format)? {
                print!("{}", render_text(&report));
            }
        }
        Some(ReportCommands::Chart) => {
            let chart = PieChart::usage(&report.summary);
            if !print_structured(&chart, format)? {
                print_chart(&chart, report.summary.percentage_used);
            }
        }
    }
    Ok(())
}

fn print_chart(chart: &PieChart, percentage_used: f64) {
    const WIDTH: usize = 40;
    let filled = ((percentage_used / 100.0) * WIDTH as f64).round().clamp(0.0, WIDTH as f64) as usize;

    println!("{}", chart.title.bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  [{}{}] {:.2}%",
        "#".repeat(filled).green(),
        ".".repeat(WIDTH - filled).dimmed(),
        percentage_used
    );
    for series in &chart.series {
        println!("  {:<12} {:>16}", series.name, amount(series.data));
    }
}
