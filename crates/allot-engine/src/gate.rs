//! Single-writer gate around owned collections.

use std::sync::{Mutex, MutexGuard};

use allot_store::AllocationStore;
use allot_types::{Allocator, AllocatorId, Target};
use serde::{Deserialize, Serialize};

use crate::engine::{AllocationEngine, RedistributionStatus};
use crate::error::{EngineError, EngineResult};
use crate::verify::{verify_ledger, LedgerViolation};

/// The two collections a run operates on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationState {
    pub allocators: Vec<Allocator>,
    pub targets: Vec<Target>,
}

impl AllocationState {
    pub fn load(store: &impl AllocationStore) -> EngineResult<Self> {
        Ok(Self {
            allocators: store.load_allocators()?,
            targets: store.load_targets()?,
        })
    }
}

/// Owns the collections and serializes every run behind one lock.
///
/// The lock is held from reset to commit, so a full run and a partial run
/// can never interleave.
pub struct RedistributionGate<S> {
    engine: AllocationEngine<S>,
    state: Mutex<AllocationState>,
}

impl<S: AllocationStore> RedistributionGate<S> {
    pub fn new(store: S, state: AllocationState) -> Self {
        Self {
            engine: AllocationEngine::new(store),
            state: Mutex::new(state),
        }
    }

    /// Build a gate over the collections currently held by `store`.
    pub fn load(store: S) -> EngineResult<Self> {
        let state = AllocationState::load(&store)?;
        Ok(Self::new(store, state))
    }

    pub fn full_redistribution(&self) -> EngineResult<RedistributionStatus> {
        let mut guard = self.lock()?;
        let AllocationState { allocators, targets } = &mut *guard;
        self.engine.full_redistribution(allocators, targets)
    }

    pub fn partial_redistribution(&self, ids: &[AllocatorId]) -> EngineResult<RedistributionStatus> {
        let mut guard = self.lock()?;
        let AllocationState { allocators, targets } = &mut *guard;
        self.engine.partial_redistribution(allocators, targets, ids)
    }

    /// Apply an external mutation while holding the run lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut AllocationState) -> R) -> EngineResult<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    pub fn snapshot(&self) -> EngineResult<AllocationState> {
        Ok(self.lock()?.clone())
    }

    pub fn verify(&self) -> EngineResult<Vec<LedgerViolation>> {
        let guard = self.lock()?;
        Ok(verify_ledger(&guard.allocators, &guard.targets))
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, AllocationState>> {
        self.state.lock().map_err(|_| EngineError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_store::InMemoryStore;
    use allot_types::TargetId;
    use std::sync::Arc;

    fn seeded_store() -> InMemoryStore {
        let allocators = (1..=4)
            .map(|i| {
                Allocator::new(AllocatorId(i), format!("allocator-{}", i), 100.0 * i as f64)
                    .with_intention(if i % 2 == 0 { "A" } else { "B" }, 50.0)
                    .with_preference("C", 3)
            })
            .collect();
        let targets = (1..=6)
            .map(|i| {
                let category = ["A", "B", "C"][(i % 3) as usize];
                Target::new(TargetId(i), format!("target-{}", i), 75.0 * i as f64, category)
            })
            .collect();
        InMemoryStore::with_data(allocators, targets)
    }

    #[test]
    fn load_runs_and_commits_through_store() {
        let gate = RedistributionGate::load(seeded_store()).unwrap();
        let status = gate.full_redistribution().unwrap();
        assert_eq!(status.outcome().unwrap().allocators_processed, 4);
        assert!(gate.verify().unwrap().is_empty());
    }

    #[test]
    fn concurrent_runs_are_serialized() {
        let gate = Arc::new(RedistributionGate::load(seeded_store()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        gate.full_redistribution().unwrap();
                    } else {
                        gate.partial_redistribution(&[AllocatorId(1 + i % 4)]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(gate.verify().unwrap().is_empty());
    }

    #[test]
    fn with_state_mutations_are_visible_to_runs() {
        let gate = RedistributionGate::load(seeded_store()).unwrap();
        gate.with_state(|state| {
            state.targets.clear();
            state
                .targets
                .push(Target::new(TargetId(10), "only", 1.0, "A"));
        })
        .unwrap();

        gate.full_redistribution().unwrap();
        let snapshot = gate.snapshot().unwrap();
        assert_eq!(snapshot.targets.len(), 1);
        assert!(snapshot.targets[0].is_fully_funded());
    }
}
