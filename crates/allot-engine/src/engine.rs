//! Full and partial redistribution orchestration.

use std::collections::BTreeSet;

use allot_store::AllocationStore;
use allot_types::{Allocator, AllocatorId, Target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::distribute::{distribute, DistributionTotals};
use crate::error::EngineResult;
use crate::reset::{reset_all, reset_for_allocator};

/// Which allocators a run recomputed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedistributionScope {
    Full,
    Partial { ids: Vec<AllocatorId> },
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedistributionOutcome {
    pub scope: RedistributionScope,
    /// Allocators whose contributions were recomputed.
    pub allocators_processed: usize,
    /// Requested ids that matched no allocator (partial runs only).
    pub unknown_ids: Vec<AllocatorId>,
    pub committed: DistributionTotals,
    pub completed_at: DateTime<Utc>,
}

impl RedistributionOutcome {
    pub fn total_committed(&self) -> f64 {
        self.committed.total()
    }
}

/// Status returned to callers of a redistribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedistributionStatus {
    Completed(RedistributionOutcome),
    /// A partial run was requested with no allocator ids; nothing was touched.
    NothingToDo,
}

impl RedistributionStatus {
    pub fn outcome(&self) -> Option<&RedistributionOutcome> {
        match self {
            RedistributionStatus::Completed(outcome) => Some(outcome),
            RedistributionStatus::NothingToDo => None,
        }
    }

    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, RedistributionStatus::NothingToDo)
    }
}

impl std::fmt::Display for RedistributionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedistributionStatus::NothingToDo => {
                write!(f, "No allocators selected for partial redistribution.")
            }
            RedistributionStatus::Completed(outcome) => match outcome.scope {
                RedistributionScope::Full => write!(
                    f,
                    "Full redistribution completed for {} allocator(s).",
                    outcome.allocators_processed
                ),
                RedistributionScope::Partial { .. } => {
                    write!(
                        f,
                        "Partial redistribution completed for {} allocator(s).",
                        outcome.allocators_processed
                    )?;
                    if !outcome.unknown_ids.is_empty() {
                        let ids: Vec<String> =
                            outcome.unknown_ids.iter().map(ToString::to_string).collect();
                        write!(f, " Unknown allocator id(s) ignored: {}.", ids.join(", "))?;
                    }
                    Ok(())
                }
            },
        }
    }
}

/// Stateless orchestrator around [`distribute`] that commits through a store.
///
/// The caller owns the collections and lends them for the duration of one
/// call. Overlapping calls on the same collections are not allowed; see
/// [`crate::RedistributionGate`].
#[derive(Debug, Clone)]
pub struct AllocationEngine<S> {
    store: S,
}

impl<S: AllocationStore> AllocationEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reset every ledger and recompute contributions for every allocator.
    pub fn full_redistribution(
        &self,
        allocators: &mut [Allocator],
        targets: &mut [Target],
    ) -> EngineResult<RedistributionStatus> {
        reset_all(targets);

        let committed = distribute(allocators.iter_mut(), targets);
        let cleared = clear_flags(allocators, |_| true);
        self.commit_or_restore(allocators, targets, &cleared)?;

        let outcome = RedistributionOutcome {
            scope: RedistributionScope::Full,
            allocators_processed: allocators.len(),
            unknown_ids: Vec::new(),
            committed,
            completed_at: Utc::now(),
        };
        info!(
            allocators = outcome.allocators_processed,
            committed = outcome.total_committed(),
            "Full redistribution completed"
        );
        Ok(RedistributionStatus::Completed(outcome))
    }

    /// Recompute contributions only for the allocators named in `ids`.
    ///
    /// Ledger entries of every other allocator are left exactly as they were.
    /// An empty `ids` is a no-op that neither mutates nor commits.
    pub fn partial_redistribution(
        &self,
        allocators: &mut [Allocator],
        targets: &mut [Target],
        ids: &[AllocatorId],
    ) -> EngineResult<RedistributionStatus> {
        if ids.is_empty() {
            return Ok(RedistributionStatus::NothingToDo);
        }

        let selected: BTreeSet<AllocatorId> = ids.iter().copied().collect();
        let unknown_ids: Vec<AllocatorId> = selected
            .iter()
            .copied()
            .filter(|id| !allocators.iter().any(|a| a.id == *id))
            .collect();
        if !unknown_ids.is_empty() {
            warn!(?unknown_ids, "Partial redistribution requested for unknown allocators");
        }

        for id in &selected {
            reset_for_allocator(targets, *id);
        }

        let committed = distribute(
            allocators.iter_mut().filter(|a| selected.contains(&a.id)),
            targets,
        );

        let processed = allocators.iter().filter(|a| selected.contains(&a.id)).count();
        let cleared = clear_flags(allocators, |a| selected.contains(&a.id));
        self.commit_or_restore(allocators, targets, &cleared)?;

        let outcome = RedistributionOutcome {
            scope: RedistributionScope::Partial {
                ids: selected.into_iter().collect(),
            },
            allocators_processed: processed,
            unknown_ids,
            committed,
            completed_at: Utc::now(),
        };
        info!(
            allocators = outcome.allocators_processed,
            committed = outcome.total_committed(),
            "Partial redistribution completed"
        );
        Ok(RedistributionStatus::Completed(outcome))
    }

    /// Persist both full collections. On failure the flags in `cleared` are
    /// raised again, so an allocator only turns clean once its run is stored.
    fn commit_or_restore(
        &self,
        allocators: &mut [Allocator],
        targets: &[Target],
        cleared: &BTreeSet<AllocatorId>,
    ) -> EngineResult<()> {
        let result = self
            .store
            .save_targets(targets)
            .and_then(|()| self.store.save_allocators(allocators));
        if let Err(e) = result {
            for allocator in allocators.iter_mut().filter(|a| cleared.contains(&a.id)) {
                allocator.needs_reallocation = true;
            }
            warn!(error = %e, restored = cleared.len(), "Redistribution commit failed");
            return Err(e.into());
        }
        Ok(())
    }
}

/// Clear the reallocation flag on every allocator matching `select`,
/// returning the ids whose flag was set.
fn clear_flags(
    allocators: &mut [Allocator],
    select: impl Fn(&Allocator) -> bool,
) -> BTreeSet<AllocatorId> {
    let mut cleared = BTreeSet::new();
    for allocator in allocators.iter_mut().filter(|a| select(a)) {
        if allocator.needs_reallocation {
            cleared.insert(allocator.id);
        }
        allocator.needs_reallocation = false;
    }
    cleared
}
