//! Store trait definition.

use allot_types::{Allocator, Category, Target};

use crate::error::StoreResult;

/// Persistence boundary for the three Allot collections.
///
/// Loads return the full current collection (empty when nothing has been
/// stored yet). Saves replace the full collection.
pub trait AllocationStore {
    fn load_allocators(&self) -> StoreResult<Vec<Allocator>>;

    fn load_targets(&self) -> StoreResult<Vec<Target>>;

    fn load_categories(&self) -> StoreResult<Vec<Category>>;

    fn save_allocators(&self, allocators: &[Allocator]) -> StoreResult<()>;

    fn save_targets(&self, targets: &[Target]) -> StoreResult<()>;

    fn save_categories(&self, categories: &[Category]) -> StoreResult<()>;
}

impl<S: AllocationStore + ?Sized> AllocationStore for &S {
    fn load_allocators(&self) -> StoreResult<Vec<Allocator>> {
        (**self).load_allocators()
    }

    fn load_targets(&self) -> StoreResult<Vec<Target>> {
        (**self).load_targets()
    }

    fn load_categories(&self) -> StoreResult<Vec<Category>> {
        (**self).load_categories()
    }

    fn save_allocators(&self, allocators: &[Allocator]) -> StoreResult<()> {
        (**self).save_allocators(allocators)
    }

    fn save_targets(&self, targets: &[Target]) -> StoreResult<()> {
        (**self).save_targets(targets)
    }

    fn save_categories(&self, categories: &[Category]) -> StoreResult<()> {
        (**self).save_categories(categories)
    }
}
