//! Funding report assembly and its plain text layout.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use allot_types::{Allocator, AllocatorId, Category, FundingStatus, Target, TargetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::{format_amount, percent_of};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// One allocator's share of a target, as listed under the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributorRow {
    pub allocator_id: AllocatorId,
    /// Allocator name, or `Allocator #id (missing)` for an orphaned entry.
    pub name: String,
    pub total: f64,
    pub from_intention: f64,
    pub from_free: f64,
    pub percent_of_need: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetRow {
    pub id: TargetId,
    pub description: String,
    pub category: Category,
    pub required: f64,
    /// Funded amount, capped at `required`.
    pub funded: f64,
    pub missing: f64,
    pub status: FundingStatus,
    pub contributors: Vec<ContributorRow>,
}

impl TargetRow {
    fn build(target: &Target, names: &HashMap<AllocatorId, &str>) -> Self {
        let status = target.funding_status();
        let (funded, missing) = match status {
            FundingStatus::Funded => (target.required_amount, 0.0),
            FundingStatus::PartiallyFunded => (target.funded_amount, target.remaining_need()),
            FundingStatus::Unfunded => (0.0, target.required_amount),
        };
        let contributors = target
            .contributions
            .iter()
            .map(|(id, c)| ContributorRow {
                allocator_id: *id,
                name: names
                    .get(id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("Allocator #{} (missing)", id)),
                total: c.total,
                from_intention: c.from_intention,
                from_free: c.from_free,
                percent_of_need: percent_of(c.total, target.required_amount),
            })
            .collect();

        Self {
            id: target.id,
            description: target.description.clone(),
            category: target.category.clone(),
            required: target.required_amount,
            funded,
            missing,
            status,
            contributors,
        }
    }
}

/// A target as seen from one contributing allocator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetContribution {
    pub target_id: TargetId,
    pub description: String,
    pub required: f64,
    pub total: f64,
    pub from_intention: f64,
    pub from_free: f64,
    pub percent_of_need: f64,
    pub status: FundingStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryContributions {
    pub category: Category,
    pub targets: Vec<TargetContribution>,
}

impl CategoryContributions {
    pub fn total(&self) -> f64 {
        self.targets.iter().map(|t| t.total).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocatorSection {
    pub id: AllocatorId,
    pub name: String,
    pub total_budget: f64,
    pub intended_total: f64,
    pub free_budget: f64,
    pub actual_spent: f64,
    pub remaining: f64,
    /// Sorted by category name.
    pub contributions: Vec<CategoryContributions>,
}

impl AllocatorSection {
    /// `allocator`'s figures and every target it contributes to.
    pub fn build(allocator: &Allocator, targets: &[Target]) -> Self {
        let mut grouped: BTreeMap<Category, Vec<TargetContribution>> = BTreeMap::new();
        for target in targets {
            if let Some(c) = target.contribution(allocator.id) {
                grouped
                    .entry(target.category.clone())
                    .or_default()
                    .push(TargetContribution {
                        target_id: target.id,
                        description: target.description.clone(),
                        required: target.required_amount,
                        total: c.total,
                        from_intention: c.from_intention,
                        from_free: c.from_free,
                        percent_of_need: percent_of(c.total, target.required_amount),
                        status: target.funding_status(),
                    });
            }
        }

        Self {
            id: allocator.id,
            name: allocator.name.clone(),
            total_budget: allocator.total_budget,
            intended_total: allocator.intended_total(),
            free_budget: allocator.free_budget(),
            actual_spent: allocator.actual_spent,
            remaining: allocator.remaining_budget(),
            contributions: grouped
                .into_iter()
                .map(|(category, targets)| CategoryContributions { category, targets })
                .collect(),
        }
    }

    pub fn has_contributions(&self) -> bool {
        !self.contributions.is_empty()
    }
}

/// Totals across every allocator and target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingSummary {
    pub total_budget: f64,
    pub total_intended: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    /// Share of `total_budget` spent, 0 when there is no budget.
    pub percentage_used: f64,
    pub funded: usize,
    pub partially_funded: usize,
    pub unfunded: usize,
}

impl FundingSummary {
    pub fn target_count(&self) -> usize {
        self.funded + self.partially_funded + self.unfunded
    }
}

/// Complete post-run view of the allocation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingReport {
    pub generated_at: DateTime<Utc>,
    pub allocators: Vec<AllocatorSection>,
    pub targets: Vec<TargetRow>,
    pub summary: FundingSummary,
}

impl FundingReport {
    pub fn build(allocators: &[Allocator], targets: &[Target]) -> Self {
        let names: HashMap<AllocatorId, &str> = allocators
            .iter()
            .map(|a| (a.id, a.name.as_str()))
            .collect();

        let rows: Vec<TargetRow> = targets.iter().map(|t| TargetRow::build(t, &names)).collect();
        let sections = allocators
            .iter()
            .map(|a| AllocatorSection::build(a, targets))
            .collect();

        let total_budget: f64 = allocators.iter().map(|a| a.total_budget).sum();
        let total_spent: f64 = allocators.iter().map(|a| a.actual_spent).sum();
        let count = |status: FundingStatus| rows.iter().filter(|r| r.status == status).count();
        let summary = FundingSummary {
            total_budget,
            total_intended: allocators.iter().map(|a| a.intended_total()).sum(),
            total_spent,
            total_remaining: total_budget - total_spent,
            percentage_used: percent_of(total_spent, total_budget),
            funded: count(FundingStatus::Funded),
            partially_funded: count(FundingStatus::PartiallyFunded),
            unfunded: count(FundingStatus::Unfunded),
        };

        Self {
            generated_at: Utc::now(),
            allocators: sections,
            targets: rows,
            summary,
        }
    }

    pub fn targets_with_status(&self, status: FundingStatus) -> impl Iterator<Item = &TargetRow> {
        self.targets.iter().filter(move |r| r.status == status)
    }
}

impl fmt::Display for FundingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "FUNDING REPORT ({})", self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "{}", RULE)?;

        writeln!(f)?;
        writeln!(f, "Allocators")?;
        writeln!(f, "{}", THIN_RULE)?;
        if self.allocators.is_empty() {
            writeln!(f, "  (no allocators)")?;
        }
        for section in &self.allocators {
            write_allocator(f, section)?;
        }

        writeln!(f)?;
        writeln!(f, "Targets")?;
        writeln!(f, "{}", THIN_RULE)?;
        for (status, heading, mark) in [
            (FundingStatus::Funded, "Funded", "+"),
            (FundingStatus::PartiallyFunded, "Partially funded", "~"),
            (FundingStatus::Unfunded, "Unfunded", "x"),
        ] {
            writeln!(f, "--- {} ---", heading)?;
            let mut any = false;
            for row in self.targets_with_status(status) {
                any = true;
                write_target(f, row, mark)?;
            }
            if !any {
                writeln!(f, "  (none)")?;
            }
        }

        let s = &self.summary;
        writeln!(f)?;
        writeln!(f, "Summary")?;
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(f, "  Total budget:     {:>16}", format_amount(s.total_budget))?;
        writeln!(f, "  Total intended:   {:>16}", format_amount(s.total_intended))?;
        writeln!(f, "  Total spent:      {:>16}", format_amount(s.total_spent))?;
        writeln!(f, "  Total remaining:  {:>16}", format_amount(s.total_remaining))?;
        writeln!(f, "  Budget used:      {:>15.2}%", s.percentage_used)?;
        writeln!(
            f,
            "  Targets: {} funded, {} partially funded, {} unfunded",
            s.funded, s.partially_funded, s.unfunded
        )?;
        writeln!(f, "{}", RULE)
    }
}

pub(crate) fn write_allocator(f: &mut fmt::Formatter<'_>, s: &AllocatorSection) -> fmt::Result {
    writeln!(f, "{} (ID: {})", s.name, s.id)?;
    writeln!(f, "  Total budget:     {:>16}", format_amount(s.total_budget))?;
    writeln!(f, "  Intended:         {:>16}", format_amount(s.intended_total))?;
    writeln!(f, "  Free budget:      {:>16}", format_amount(s.free_budget))?;
    writeln!(f, "  Actual spent:     {:>16}", format_amount(s.actual_spent))?;
    writeln!(f, "  Remaining:        {:>16}", format_amount(s.remaining))?;
    if !s.has_contributions() {
        writeln!(f, "  No contributions.")?;
    }
    for group in &s.contributions {
        writeln!(f, "  > {}", group.category)?;
        for t in &group.targets {
            writeln!(
                f,
                "    - '{}' (ID: {}): {} of {} ({:.2}% of need), {}",
                t.description,
                t.target_id,
                format_amount(t.total),
                format_amount(t.required),
                t.percent_of_need,
                t.status,
            )?;
            write_split(f, "      ", t.from_intention, t.from_free)?;
        }
    }
    writeln!(f)
}

fn write_target(f: &mut fmt::Formatter<'_>, row: &TargetRow, mark: &str) -> fmt::Result {
    writeln!(
        f,
        "  [{}] '{}' (ID: {}, {}, required {})",
        mark,
        row.description,
        row.id,
        row.category,
        format_amount(row.required),
    )?;
    match row.status {
        FundingStatus::Unfunded => {}
        FundingStatus::Funded => writeln!(f, "      Funded: {}", format_amount(row.funded))?,
        FundingStatus::PartiallyFunded => writeln!(
            f,
            "      Funded: {}, missing: {}",
            format_amount(row.funded),
            format_amount(row.missing),
        )?,
    }
    for c in &row.contributors {
        writeln!(
            f,
            "      - {}: {} ({:.2}%)",
            c.name,
            format_amount(c.total),
            c.percent_of_need,
        )?;
        write_split(f, "        ", c.from_intention, c.from_free)?;
    }
    Ok(())
}

fn write_split(f: &mut fmt::Formatter<'_>, indent: &str, intention: f64, free: f64) -> fmt::Result {
    if intention > 0.0 {
        writeln!(f, "{}intention: {}", indent, format_amount(intention))?;
    }
    if free > 0.0 {
        writeln!(f, "{}free: {}", indent, format_amount(free))?;
    }
    Ok(())
}
