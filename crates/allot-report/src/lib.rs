//! # allot-report
//!
//! Read-only views over the allocator and target collections after an
//! engine run. Nothing here mutates state.
//!
//! - [`FundingReport`]: per-target rows, per-allocator sections and an
//!   overall usage summary
//! - [`AllocatorDetail`]: one allocator's inputs, contributions and
//!   [`AllocatorCharts`]
//! - [`PieChart`]: chart data, e.g. used versus remaining budget
//! - [`render_text`]: the fixed-layout plain text report

#![deny(unsafe_code)]

pub mod chart;
pub mod detail;
pub mod format;
pub mod report;

pub use chart::{AllocatorCharts, ChartSeries, PieChart};
pub use detail::AllocatorDetail;
pub use format::format_amount;
pub use report::{
    AllocatorSection, CategoryContributions, ContributorRow, FundingReport, FundingSummary,
    TargetContribution, TargetRow,
};

/// Render `report` as plain text.
pub fn render_text(report: &FundingReport) -> String {
    report.to_string()
}
