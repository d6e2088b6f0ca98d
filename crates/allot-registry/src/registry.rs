use std::collections::{BTreeMap, BTreeSet};

use allot_engine::{verify_ledger, AllocationEngine, LedgerViolation, RedistributionStatus};
use allot_store::AllocationStore;
use allot_types::{
    approx_eq, Allocator, AllocatorId, Category, CategoryIntention, Target, TargetId,
    MAX_PREFERENCE_POINTS,
};
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};

/// Partial update of an allocator's descriptive fields and budget.
///
/// `None` leaves a field unchanged; `profile: Some(None)` clears the profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllocatorUpdate {
    pub name: Option<String>,
    pub total_budget: Option<f64>,
    pub profile: Option<Option<String>>,
}

/// Owner of the three collections, persisting every mutation through `S`.
pub struct Registry<S> {
    store: S,
    allocators: Vec<Allocator>,
    targets: Vec<Target>,
    categories: Vec<Category>,
}

impl<S: AllocationStore> Registry<S> {
    /// Load every collection from `store`.
    pub fn load(store: S) -> RegistryResult<Self> {
        let allocators = store.load_allocators()?;
        let targets = store.load_targets()?;
        let categories = store.load_categories()?;
        debug!(
            allocators = allocators.len(),
            targets = targets.len(),
            categories = categories.len(),
            "Registry loaded"
        );
        Ok(Self {
            store,
            allocators,
            targets,
            categories,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn allocators(&self) -> &[Allocator] {
        &self.allocators
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn allocator(&self, id: AllocatorId) -> Option<&Allocator> {
        self.allocators.iter().find(|a| a.id == id)
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Allocators currently flagged for reallocation.
    pub fn pending_reallocation(&self) -> Vec<&Allocator> {
        self.allocators.iter().filter(|a| a.needs_reallocation).collect()
    }

    // --- Allocators ---

    pub fn add_allocator(
        &mut self,
        name: &str,
        total_budget: f64,
        profile: Option<String>,
    ) -> RegistryResult<&Allocator> {
        let name = non_empty(name, "allocator name")?;
        check_amount("total_budget", total_budget)?;

        let id = AllocatorId(self.allocators.iter().map(|a| a.id.0).max().unwrap_or(0) + 1);
        let mut allocator = Allocator::new(id, name, total_budget);
        allocator.profile = profile.filter(|p| !p.trim().is_empty());
        self.allocators.push(allocator);
        self.store.save_allocators(&self.allocators)?;

        info!(allocator = %id, total_budget, "Allocator added");
        Ok(&self.allocators[self.allocators.len() - 1])
    }

    /// Apply `update`. Returns whether the allocator was flagged for
    /// reallocation (only a budget change does that).
    pub fn update_allocator(&mut self, id: AllocatorId, update: AllocatorUpdate) -> RegistryResult<bool> {
        let name = update
            .name
            .as_deref()
            .map(|n| non_empty(n, "allocator name"))
            .transpose()?;
        if let Some(budget) = update.total_budget {
            check_amount("total_budget", budget)?;
        }

        let allocator = self.allocator_mut(id)?;
        let mut budget_changed = false;
        if let Some(budget) = update.total_budget {
            let intended = allocator.intended_total();
            if exceeds(intended, budget) {
                return Err(RegistryError::IntentionsExceedBudget { intended, budget });
            }
            budget_changed = !approx_eq(allocator.total_budget, budget);
            allocator.total_budget = budget;
        }
        if let Some(name) = name {
            allocator.name = name;
        }
        if let Some(profile) = update.profile {
            allocator.profile = profile.filter(|p| !p.trim().is_empty());
        }
        if budget_changed {
            allocator.needs_reallocation = true;
        }

        self.store.save_allocators(&self.allocators)?;
        debug!(allocator = %id, budget_changed, "Allocator updated");
        Ok(budget_changed)
    }

    /// Replace the allocator's intentions, keeping the given order.
    ///
    /// Zero amounts are dropped. Categories are normalized and registered.
    pub fn set_intentions(&mut self, id: AllocatorId, intentions: Vec<CategoryIntention>) -> RegistryResult<()> {
        let mut seen = BTreeSet::new();
        let mut cleaned = Vec::with_capacity(intentions.len());
        for intention in intentions {
            check_amount("intention", intention.amount)?;
            let category = self.normalize_category(intention.category.as_str())?;
            if !seen.insert(category.clone()) {
                return Err(RegistryError::DuplicateIntention(category));
            }
            if approx_eq(intention.amount, 0.0) {
                continue;
            }
            cleaned.push(CategoryIntention::new(category, intention.amount));
        }

        let intended: f64 = cleaned.iter().map(|i| i.amount).sum();
        let budget = self.allocator(id).ok_or(RegistryError::AllocatorNotFound(id))?.total_budget;
        if exceeds(intended, budget) {
            return Err(RegistryError::IntentionsExceedBudget { intended, budget });
        }

        self.save_allocator_change(id, |allocator| allocator.intentions = cleaned)?;
        self.register_categories(seen)?;
        debug!(allocator = %id, intended, "Intentions updated");
        Ok(())
    }

    /// Replace the allocator's preference scores. Zero scores are dropped.
    pub fn set_preferences(&mut self, id: AllocatorId, scores: BTreeMap<String, u32>) -> RegistryResult<()> {
        let mut seen = BTreeSet::new();
        let mut cleaned = BTreeMap::new();
        for (name, score) in scores {
            let category = self.normalize_category(&name)?;
            if !seen.insert(category.clone()) {
                return Err(RegistryError::DuplicatePreference(category));
            }
            if score > MAX_PREFERENCE_POINTS {
                return Err(RegistryError::InvalidPreference { category, score });
            }
            if score > 0 {
                // score <= 10 fits in u8
                cleaned.insert(category, score as u8);
            }
        }

        let total: u32 = cleaned.values().map(|s| u32::from(*s)).sum();
        if total > MAX_PREFERENCE_POINTS {
            return Err(RegistryError::PreferencesExceedLimit {
                total,
                limit: MAX_PREFERENCE_POINTS,
            });
        }

        let categories: BTreeSet<Category> = cleaned.keys().cloned().collect();
        self.save_allocator_change(id, |allocator| allocator.preferences = cleaned)?;
        self.register_categories(categories)?;
        debug!(allocator = %id, total, "Preferences updated");
        Ok(())
    }

    /// Remove an allocator and withdraw its contributions from every target.
    pub fn delete_allocator(&mut self, id: AllocatorId) -> RegistryResult<Allocator> {
        let index = self
            .allocators
            .iter()
            .position(|a| a.id == id)
            .ok_or(RegistryError::AllocatorNotFound(id))?;
        let removed = self.allocators.remove(index);

        for target in self.targets.iter_mut() {
            target.withdraw(id);
        }
        self.mark_all_dirty();

        self.store.save_targets(&self.targets)?;
        self.store.save_allocators(&self.allocators)?;
        info!(allocator = %id, "Allocator deleted");
        Ok(removed)
    }

    // --- Targets ---

    pub fn add_target(&mut self, description: &str, required_amount: f64, category: &str) -> RegistryResult<&Target> {
        let description = non_empty(description, "target description")?;
        if !required_amount.is_finite() || required_amount <= 0.0 {
            return Err(RegistryError::InvalidAmount {
                field: "required_amount",
                value: required_amount,
            });
        }
        let category = self.normalize_category(category)?;

        let id = TargetId(self.targets.iter().map(|t| t.id.0).max().unwrap_or(0) + 1);
        self.targets
            .push(Target::new(id, description, required_amount, category.clone()));
        self.mark_all_dirty();

        self.store.save_targets(&self.targets)?;
        self.store.save_allocators(&self.allocators)?;
        self.register_categories([category])?;
        info!(target = %id, required_amount, "Target added");
        Ok(&self.targets[self.targets.len() - 1])
    }

    pub fn delete_target(&mut self, id: TargetId) -> RegistryResult<Target> {
        let index = self
            .targets
            .iter()
            .position(|t| t.id == id)
            .ok_or(RegistryError::TargetNotFound(id))?;
        let removed = self.targets.remove(index);
        self.mark_all_dirty();

        self.store.save_targets(&self.targets)?;
        self.store.save_allocators(&self.allocators)?;
        info!(target = %id, "Target deleted");
        Ok(removed)
    }

    // --- Categories ---

    pub fn add_category(&mut self, name: &str) -> RegistryResult<Category> {
        let category = self.normalize_category(name)?;
        if self.categories.contains(&category) {
            return Err(RegistryError::DuplicateCategory(category));
        }
        self.categories.push(category.clone());
        self.store.save_categories(&self.categories)?;
        Ok(category)
    }

    /// Remove a category nothing refers to.
    ///
    /// Refused while any allocator intends or prefers it, or any target
    /// belongs to it.
    pub fn delete_category(&mut self, name: &str) -> RegistryResult<Category> {
        let category = Category::normalized(name);
        let index = self
            .categories
            .iter()
            .position(|c| *c == category)
            .ok_or_else(|| RegistryError::CategoryNotFound(name.trim().to_string()))?;
        if let Some(reason) = self.category_usage(&category) {
            return Err(RegistryError::CategoryInUse { category, reason });
        }
        let removed = self.categories.remove(index);
        self.store.save_categories(&self.categories)?;
        Ok(removed)
    }

    pub fn category_exists(&self, name: &str) -> bool {
        self.categories.contains(&Category::normalized(name))
    }

    /// First record referring to `category`, described for the user.
    pub fn category_usage(&self, category: &Category) -> Option<String> {
        for allocator in &self.allocators {
            if allocator.intention_for(category).is_some() {
                return Some(format!("allocator '{}' has an intention for it", allocator.name));
            }
            if allocator.preference(category) > 0 {
                return Some(format!("allocator '{}' has a preference for it", allocator.name));
            }
        }
        self.targets
            .iter()
            .find(|t| t.category == *category)
            .map(|t| format!("target '{}' belongs to it", t.description))
    }

    // --- Engine ---

    pub fn redistribute_full(&mut self) -> RegistryResult<RedistributionStatus> {
        let engine = AllocationEngine::new(&self.store);
        Ok(engine.full_redistribution(&mut self.allocators, &mut self.targets)?)
    }

    pub fn redistribute_partial(&mut self, ids: &[AllocatorId]) -> RegistryResult<RedistributionStatus> {
        let engine = AllocationEngine::new(&self.store);
        Ok(engine.partial_redistribution(&mut self.allocators, &mut self.targets, ids)?)
    }

    /// Partial run over every allocator currently flagged for reallocation.
    pub fn redistribute_pending(&mut self) -> RegistryResult<RedistributionStatus> {
        let ids: Vec<AllocatorId> = self.pending_reallocation().iter().map(|a| a.id).collect();
        self.redistribute_partial(&ids)
    }

    pub fn verify(&self) -> Vec<LedgerViolation> {
        verify_ledger(&self.allocators, &self.targets)
    }

    // --- Internal ---

    fn allocator_mut(&mut self, id: AllocatorId) -> RegistryResult<&mut Allocator> {
        self.allocators
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegistryError::AllocatorNotFound(id))
    }

    /// Apply `change` to a copy of allocator `id`, persist the collection,
    /// then adopt it. The allocator is flagged for reallocation.
    fn save_allocator_change(&mut self, id: AllocatorId, change: impl FnOnce(&mut Allocator)) -> RegistryResult<()> {
        let index = self
            .allocators
            .iter()
            .position(|a| a.id == id)
            .ok_or(RegistryError::AllocatorNotFound(id))?;
        let mut staged = self.allocators.clone();
        change(&mut staged[index]);
        staged[index].needs_reallocation = true;
        self.store.save_allocators(&staged)?;
        self.allocators = staged;
        Ok(())
    }

    fn mark_all_dirty(&mut self) {
        for allocator in self.allocators.iter_mut() {
            allocator.needs_reallocation = true;
        }
    }

    fn normalize_category(&self, name: &str) -> RegistryResult<Category> {
        let category = Category::normalized(name);
        if category.is_empty() {
            return Err(RegistryError::EmptyName("category"));
        }
        Ok(category)
    }

    fn register_categories(&mut self, categories: impl IntoIterator<Item = Category>) -> RegistryResult<()> {
        let mut staged = self.categories.clone();
        for category in categories {
            if !staged.contains(&category) {
                staged.push(category);
            }
        }
        if staged.len() != self.categories.len() {
            self.store.save_categories(&staged)?;
            self.categories = staged;
        }
        Ok(())
    }
}

fn non_empty(value: &str, field: &'static str) -> RegistryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::EmptyName(field));
    }
    Ok(trimmed.to_string())
}

fn check_amount(field: &'static str, value: f64) -> RegistryResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RegistryError::InvalidAmount { field, value });
    }
    Ok(())
}

fn exceeds(amount: f64, limit: f64) -> bool {
    amount > limit && !approx_eq(amount, limit)
}
