//! Ledger invariant checks.

use std::collections::BTreeMap;

use allot_types::{approx_eq, Allocator, AllocatorId, Target, TargetId, AMOUNT_EPSILON};
use serde::Serialize;
use thiserror::Error;

/// A broken ledger invariant.
#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerViolation {
    #[error("target {target}: funded amount {funded} differs from ledger total {ledger}")]
    FundedMismatch {
        target: TargetId,
        funded: f64,
        ledger: f64,
    },

    #[error("target {target}: entry for allocator {allocator} does not split into its parts")]
    SplitMismatch {
        target: TargetId,
        allocator: AllocatorId,
    },

    #[error("target {target}: entry for allocator {allocator} is negative")]
    NegativeAmount {
        target: TargetId,
        allocator: AllocatorId,
    },

    #[error("target {target}: entry for allocator {allocator} has no matching allocator")]
    OrphanContribution {
        target: TargetId,
        allocator: AllocatorId,
    },

    #[error("allocator {allocator}: actual spent {actual_spent} differs from ledger total {ledger}")]
    SpentMismatch {
        allocator: AllocatorId,
        actual_spent: f64,
        ledger: f64,
    },

    #[error("allocator {allocator}: committed {committed} exceeds budget {budget}")]
    OverCommitted {
        allocator: AllocatorId,
        committed: f64,
        budget: f64,
    },
}

/// Check every ledger invariant over the full collections.
///
/// Returns an empty list when the ledger is consistent.
pub fn verify_ledger(allocators: &[Allocator], targets: &[Target]) -> Vec<LedgerViolation> {
    let mut violations = Vec::new();
    let mut per_allocator: BTreeMap<AllocatorId, f64> = BTreeMap::new();

    for target in targets {
        let ledger = target.ledger_total();
        if !approx_eq(target.funded_amount, ledger) {
            violations.push(LedgerViolation::FundedMismatch {
                target: target.id,
                funded: target.funded_amount,
                ledger,
            });
        }

        for (allocator, entry) in &target.contributions {
            if entry.total < -AMOUNT_EPSILON
                || entry.from_intention < -AMOUNT_EPSILON
                || entry.from_free < -AMOUNT_EPSILON
            {
                violations.push(LedgerViolation::NegativeAmount {
                    target: target.id,
                    allocator: *allocator,
                });
            }
            if !approx_eq(entry.total, entry.from_intention + entry.from_free) {
                violations.push(LedgerViolation::SplitMismatch {
                    target: target.id,
                    allocator: *allocator,
                });
            }
            if !allocators.iter().any(|a| a.id == *allocator) {
                violations.push(LedgerViolation::OrphanContribution {
                    target: target.id,
                    allocator: *allocator,
                });
            }
            *per_allocator.entry(*allocator).or_default() += entry.total;
        }
    }

    for allocator in allocators {
        let ledger = per_allocator.get(&allocator.id).copied().unwrap_or(0.0);
        if !approx_eq(allocator.actual_spent, ledger) {
            violations.push(LedgerViolation::SpentMismatch {
                allocator: allocator.id,
                actual_spent: allocator.actual_spent,
                ledger,
            });
        }
        if ledger > allocator.total_budget && !approx_eq(ledger, allocator.total_budget) {
            violations.push(LedgerViolation::OverCommitted {
                allocator: allocator.id,
                committed: ledger,
                budget: allocator.total_budget,
            });
        }
    }

    violations
}
