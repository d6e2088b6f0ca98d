//! Two-phase greedy distribution.
//!
//! Phase 1 spends each allocator's declared intentions, category by category
//! in declared order, funding the smallest needs of that category first.
//! Phase 2 spends whatever is left across every under-funded target, ranked
//! by (already partially funded, allocator preference, required amount),
//! all descending.
//!
//! Phase 1 runs for every allocator of the run before phase 2 starts for any
//! of them. Both sorts are stable, so equal keys keep collection order.

use std::cmp::Ordering;

use allot_types::{is_positive, Allocator, Target};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Amounts committed by one `distribute` call, split by phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionTotals {
    pub from_intentions: f64,
    pub from_free: f64,
}

impl DistributionTotals {
    pub fn total(&self) -> f64 {
        self.from_intentions + self.from_free
    }
}

/// Distribute the budgets of `allocators` across `targets`.
///
/// `targets` must be the full collection so that amounts already committed by
/// allocators outside this run are respected. Each allocator's `actual_spent`
/// is reset to zero and recomputed; the per-allocator available-funds counter
/// lives only for the duration of this call.
pub fn distribute<'a, I>(allocators: I, targets: &mut [Target]) -> DistributionTotals
where
    I: IntoIterator<Item = &'a mut Allocator>,
{
    let mut allocators: Vec<&mut Allocator> = allocators.into_iter().collect();
    let mut available: Vec<f64> = allocators
        .iter_mut()
        .map(|allocator| {
            allocator.actual_spent = 0.0;
            allocator.total_budget
        })
        .collect();

    let mut totals = DistributionTotals::default();

    for (allocator, available) in allocators.iter_mut().zip(available.iter_mut()) {
        let spent = apply_intentions(allocator, available, targets);
        debug!(
            allocator = %allocator.id,
            spent,
            remaining = *available,
            "Intention phase complete"
        );
        totals.from_intentions += spent;
    }

    for (allocator, available) in allocators.iter_mut().zip(available.iter_mut()) {
        if !is_positive(*available) {
            continue;
        }
        let spent = apply_free_funds(allocator, available, targets);
        debug!(
            allocator = %allocator.id,
            spent,
            remaining = *available,
            "Free-fund phase complete"
        );
        totals.from_free += spent;
    }

    totals
}

/// Phase 1 for a single allocator. Returns the amount committed.
fn apply_intentions(allocator: &mut Allocator, available: &mut f64, targets: &mut [Target]) -> f64 {
    let mut spent = 0.0;

    for intention in &allocator.intentions {
        if !is_positive(intention.amount) || !is_positive(*available) {
            continue;
        }

        let mut in_category: Vec<usize> = targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.category == intention.category)
            .map(|(index, _)| index)
            .collect();
        in_category.sort_by(|&a, &b| {
            targets[a]
                .required_amount
                .total_cmp(&targets[b].required_amount)
        });

        let mut category_budget = intention.amount.min(*available);

        for index in in_category {
            let target = &mut targets[index];
            let need = target.remaining_need();
            if !is_positive(need) {
                continue;
            }

            let amount = category_budget.min(need);
            if is_positive(amount) {
                target.credit_intention(allocator.id, amount);
                category_budget -= amount;
                *available -= amount;
                allocator.actual_spent += amount;
                spent += amount;
                trace!(
                    allocator = %allocator.id,
                    target = %target.id,
                    category = %intention.category,
                    amount,
                    "Intention contribution"
                );
            }

            if !is_positive(category_budget) || !is_positive(*available) {
                break;
            }
        }
    }

    spent
}

struct Candidate {
    index: usize,
    partially_funded: bool,
    preference: u8,
    required_amount: f64,
}

fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.partially_funded
        .cmp(&a.partially_funded)
        .then(b.preference.cmp(&a.preference))
        .then(b.required_amount.total_cmp(&a.required_amount))
}

/// Phase 2 for a single allocator. Returns the amount committed.
fn apply_free_funds(allocator: &mut Allocator, available: &mut f64, targets: &mut [Target]) -> f64 {
    let mut candidates: Vec<Candidate> = targets
        .iter()
        .enumerate()
        .filter(|(_, t)| is_positive(t.remaining_need()))
        .map(|(index, t)| Candidate {
            index,
            partially_funded: is_positive(t.funded_amount),
            preference: allocator.preference(&t.category),
            required_amount: t.required_amount,
        })
        .collect();
    candidates.sort_by(rank);

    let mut spent = 0.0;

    for candidate in candidates {
        if !is_positive(*available) {
            break;
        }

        let target = &mut targets[candidate.index];
        let need = target.remaining_need();
        if !is_positive(need) {
            continue;
        }

        let amount = available.min(need);
        target.credit_free(allocator.id, amount);
        *available -= amount;
        allocator.actual_spent += amount;
        spent += amount;
        trace!(
            allocator = %allocator.id,
            target = %target.id,
            preference = candidate.preference,
            amount,
            "Free-fund contribution"
        );
    }

    spent
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_types::{AllocatorId, TargetId};

    fn target(id: u64, category: &str, required: f64) -> Target {
        Target::new(TargetId(id), format!("target-{}", id), required, category)
    }

    fn funded(t: &Target, allocator: u64) -> (f64, f64) {
        t.contribution(AllocatorId(allocator))
            .map(|c| (c.from_intention, c.from_free))
            .unwrap_or((0.0, 0.0))
    }

    #[test]
    fn smallest_need_is_funded_first_within_a_category() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 300.0).with_intention("X", 300.0)];
        let mut targets = vec![target(1, "X", 500.0), target(2, "X", 100.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(targets[1].funded_amount, 100.0);
        assert_eq!(targets[0].funded_amount, 200.0);
        assert_eq!(funded(&targets[0], 1), (200.0, 0.0));
        assert_eq!(allocators[0].actual_spent, 300.0);
    }

    #[test]
    fn end_to_end_two_phase_scenario() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 1000.0)
            .with_intention("X", 600.0)
            .with_preference("X", 5)
            .with_preference("Y", 5)];
        let mut targets = vec![target(1, "X", 200.0), target(2, "X", 500.0), target(3, "Y", 300.0)];

        let totals = distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(funded(&targets[0], 1), (200.0, 0.0));
        assert_eq!(funded(&targets[1], 1), (400.0, 100.0));
        assert_eq!(funded(&targets[2], 1), (0.0, 300.0));
        assert!(targets.iter().all(Target::is_fully_funded));
        assert_eq!(allocators[0].actual_spent, 1000.0);
        assert_eq!(totals.from_intentions, 600.0);
        assert_eq!(totals.from_free, 400.0);
    }

    #[test]
    fn free_funds_prefer_partially_funded_targets() {
        let mut targets = vec![target(1, "A", 100.0), target(2, "A", 100.0)];
        targets[1].credit_free(AllocatorId(9), 10.0);
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 90.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(targets[1].funded_amount, 100.0);
        assert_eq!(targets[0].funded_amount, 0.0);
    }

    #[test]
    fn free_funds_follow_preference_then_size() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 100.0)
            .with_preference("Low", 1)
            .with_preference("High", 6)];
        let mut targets = vec![target(1, "Low", 500.0), target(2, "High", 100.0)];
        distribute(allocators.iter_mut(), &mut targets);
        assert_eq!(targets[1].funded_amount, 100.0);
        assert_eq!(targets[0].funded_amount, 0.0);

        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 100.0)];
        let mut targets = vec![target(1, "A", 150.0), target(2, "B", 400.0)];
        distribute(allocators.iter_mut(), &mut targets);
        assert_eq!(targets[1].funded_amount, 100.0);
        assert_eq!(targets[0].funded_amount, 0.0);
    }

    #[test]
    fn equal_rank_keeps_collection_order() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 50.0)];
        let mut targets = vec![target(1, "A", 100.0), target(2, "B", 100.0)];
        distribute(allocators.iter_mut(), &mut targets);
        assert_eq!(targets[0].funded_amount, 50.0);
        assert_eq!(targets[1].funded_amount, 0.0);
    }

    #[test]
    fn intentions_are_consumed_in_declared_order() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 100.0)
            .with_intention("B", 100.0)
            .with_intention("A", 100.0)];
        let mut targets = vec![target(1, "A", 100.0), target(2, "B", 100.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(targets[1].funded_amount, 100.0);
        assert_eq!(targets[0].funded_amount, 0.0);
    }

    #[test]
    fn over_declared_intention_is_clipped_by_budget() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 100.0).with_intention("A", 500.0)];
        let mut targets = vec![target(1, "A", 400.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(targets[0].funded_amount, 100.0);
        assert_eq!(allocators[0].actual_spent, 100.0);
    }

    #[test]
    fn zero_and_negative_inputs_are_no_ops() {
        let mut allocators = vec![
            Allocator::new(AllocatorId(1), "Ana", 0.0).with_intention("A", 50.0),
            Allocator::new(AllocatorId(2), "Bia", 10.0).with_intention("A", -5.0),
        ];
        let mut targets = vec![target(1, "A", 100.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert!(targets[0].contribution(AllocatorId(1)).is_none());
        assert_eq!(funded(&targets[0], 2), (0.0, 10.0));
        assert_eq!(allocators[0].actual_spent, 0.0);
    }

    #[test]
    fn intention_without_matching_targets_flows_to_free_phase() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 100.0).with_intention("Nowhere", 100.0)];
        let mut targets = vec![target(1, "A", 60.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(funded(&targets[0], 1), (0.0, 60.0));
        assert_eq!(allocators[0].actual_spent, 60.0);
    }

    #[test]
    fn intention_phase_runs_for_all_allocators_before_free_phase() {
        // Ana has only free funds; Bia declares an intention for the same target.
        // Bia's intention lands first even though Ana comes first in the run.
        let mut allocators = vec![
            Allocator::new(AllocatorId(1), "Ana", 100.0),
            Allocator::new(AllocatorId(2), "Bia", 100.0).with_intention("A", 100.0),
        ];
        let mut targets = vec![target(1, "A", 100.0), target(2, "B", 100.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(funded(&targets[0], 2), (100.0, 0.0));
        assert_eq!(funded(&targets[1], 1), (0.0, 100.0));
    }

    #[test]
    fn existing_contributions_of_others_are_respected() {
        let mut targets = vec![target(1, "A", 100.0)];
        targets[0].credit_intention(AllocatorId(9), 70.0);
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 100.0).with_intention("A", 100.0)];

        distribute(allocators.iter_mut(), &mut targets);

        assert_eq!(funded(&targets[0], 1), (30.0, 0.0));
        assert_eq!(targets[0].funded_amount, 100.0);
        assert_eq!(allocators[0].actual_spent, 30.0);
    }

    #[test]
    fn distribute_resets_actual_spent() {
        let mut allocators = vec![Allocator::new(AllocatorId(1), "Ana", 10.0)];
        allocators[0].actual_spent = 999.0;
        let mut targets: Vec<Target> = vec![];
        distribute(allocators.iter_mut(), &mut targets);
        assert_eq!(allocators[0].actual_spent, 0.0);
    }
}
