//! Single-allocator view: figures, inputs, contributions and charts.

use std::collections::BTreeMap;
use std::fmt;

use allot_types::{Allocator, Category, CategoryIntention, Target, MAX_PREFERENCE_POINTS};
use serde::{Deserialize, Serialize};

use crate::chart::{AllocatorCharts, PieChart};
use crate::format::{format_amount, percent_of};
use crate::report::{write_allocator, AllocatorSection};

const RULE: &str = "============================================================";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocatorDetail {
    pub section: AllocatorSection,
    pub profile: Option<String>,
    pub needs_reallocation: bool,
    pub intentions: Vec<CategoryIntention>,
    pub preferences: BTreeMap<Category, u8>,
    pub preference_total: u32,
    pub charts: AllocatorCharts,
}

impl AllocatorDetail {
    pub fn build(allocator: &Allocator, targets: &[Target]) -> Self {
        let section = AllocatorSection::build(allocator, targets);
        let charts = AllocatorCharts::build(allocator, &section);
        Self {
            section,
            profile: allocator.profile.clone(),
            needs_reallocation: allocator.needs_reallocation,
            intentions: allocator.intentions.clone(),
            preferences: allocator.preferences.clone(),
            preference_total: allocator.preference_total(),
            charts,
        }
    }
}

impl fmt::Display for AllocatorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        write_allocator(f, &self.section)?;
        writeln!(f, "  Profile: {}", self.profile.as_deref().unwrap_or("(none)"))?;
        writeln!(
            f,
            "  Pending reallocation: {}",
            if self.needs_reallocation { "yes" } else { "no" }
        )?;

        writeln!(f)?;
        writeln!(f, "Intentions")?;
        if self.intentions.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (i, intention) in self.intentions.iter().enumerate() {
            writeln!(
                f,
                "  {}. {:<20} {:>16}",
                i + 1,
                intention.category.as_str(),
                format_amount(intention.amount)
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Preferences ({}/{} points)",
            self.preference_total, MAX_PREFERENCE_POINTS
        )?;
        if self.preferences.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (category, score) in &self.preferences {
            writeln!(f, "  {:<23} {:>2}", category.as_str(), score)?;
        }

        writeln!(f)?;
        writeln!(f, "Charts")?;
        if self.charts.is_empty() {
            writeln!(f, "  (no chart data)")?;
        }
        for chart in self.charts.iter() {
            write_chart(f, chart)?;
        }
        writeln!(f, "{}", RULE)
    }
}

fn write_chart(f: &mut fmt::Formatter<'_>, chart: &PieChart) -> fmt::Result {
    let total = chart.total();
    writeln!(f, "  {}", chart.title)?;
    for slice in &chart.series {
        writeln!(
            f,
            "    {:<20} {:>16} ({:>6.2}%)",
            slice.name,
            format_amount(slice.data),
            percent_of(slice.data, total)
        )?;
    }
    Ok(())
}
