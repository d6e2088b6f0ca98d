//! In-memory collection store.

use std::sync::Mutex;

use allot_types::{Allocator, Category, Target};

use crate::error::{StoreError, StoreResult};
use crate::traits::AllocationStore;

/// Number of save calls observed per collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveCounts {
    pub allocators: usize,
    pub targets: usize,
    pub categories: usize,
}

/// One of the three stored collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Allocators,
    Targets,
    Categories,
}

#[derive(Debug, Default)]
struct Collections {
    allocators: Vec<Allocator>,
    targets: Vec<Target>,
    categories: Vec<Category>,
    saves: SaveCounts,
    failing: Option<Collection>,
}

impl Collections {
    fn check_writable(&self, collection: Collection) -> StoreResult<()> {
        if self.failing == Some(collection) {
            return Err(StoreError::Io(std::io::Error::other(format!(
                "{:?} store is not writable",
                collection
            ))));
        }
        Ok(())
    }
}

/// Process-local store. Keeps the last saved copy of each collection.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with initial collections without counting saves.
    pub fn with_data(allocators: Vec<Allocator>, targets: Vec<Target>) -> Self {
        Self {
            data: Mutex::new(Collections {
                allocators,
                targets,
                ..Default::default()
            }),
        }
    }

    pub fn save_counts(&self) -> StoreResult<SaveCounts> {
        Ok(self.lock()?.saves)
    }

    /// Make every later save of `collection` fail with an io error.
    /// `None` makes the store writable again.
    pub fn fail_saves(&self, collection: Option<Collection>) -> StoreResult<()> {
        self.lock()?.failing = collection;
        Ok(())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Collections>> {
        self.data.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl AllocationStore for InMemoryStore {
    fn load_allocators(&self) -> StoreResult<Vec<Allocator>> {
        Ok(self.lock()?.allocators.clone())
    }

    fn load_targets(&self) -> StoreResult<Vec<Target>> {
        Ok(self.lock()?.targets.clone())
    }

    fn load_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.lock()?.categories.clone())
    }

    fn save_allocators(&self, allocators: &[Allocator]) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.check_writable(Collection::Allocators)?;
        data.allocators = allocators.to_vec();
        data.saves.allocators += 1;
        Ok(())
    }

    fn save_targets(&self, targets: &[Target]) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.check_writable(Collection::Targets)?;
        data.targets = targets.to_vec();
        data.saves.targets += 1;
        Ok(())
    }

    fn save_categories(&self, categories: &[Category]) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.check_writable(Collection::Categories)?;
        data.categories = categories.to_vec();
        data.saves.categories += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_types::{AllocatorId, TargetId};

    #[test]
    fn seeded_data_loads_without_saves() {
        let store = InMemoryStore::with_data(
            vec![Allocator::new(AllocatorId(1), "Ana", 10.0)],
            vec![Target::new(TargetId(1), "Well", 5.0, "Water")],
        );
        assert_eq!(store.load_allocators().unwrap().len(), 1);
        assert_eq!(store.load_targets().unwrap().len(), 1);
        assert_eq!(store.save_counts().unwrap(), SaveCounts::default());
    }

    #[test]
    fn saves_are_counted_per_collection() {
        let store = InMemoryStore::new();
        store.save_targets(&[]).unwrap();
        store.save_targets(&[]).unwrap();
        store.save_allocators(&[]).unwrap();

        let counts = store.save_counts().unwrap();
        assert_eq!(counts.targets, 2);
        assert_eq!(counts.allocators, 1);
        assert_eq!(counts.categories, 0);
    }

    #[test]
    fn failing_collection_rejects_saves_until_cleared() {
        let store = InMemoryStore::new();
        store.fail_saves(Some(Collection::Targets)).unwrap();

        let err = store.save_targets(&[]).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        store.save_allocators(&[]).unwrap();
        assert_eq!(store.save_counts().unwrap().targets, 0);

        store.fail_saves(None).unwrap();
        store.save_targets(&[]).unwrap();
        assert_eq!(store.save_counts().unwrap().targets, 1);
    }
}
