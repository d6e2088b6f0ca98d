use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::ids::AllocatorId;

/// Upper bound on the sum of an allocator's preference scores.
pub const MAX_PREFERENCE_POINTS: u32 = 10;

/// An amount an allocator declares it intends to commit to one category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryIntention {
    pub category: Category,
    pub amount: f64,
}

impl CategoryIntention {
    pub fn new(category: impl Into<Category>, amount: f64) -> Self {
        Self {
            category: category.into(),
            amount,
        }
    }
}

/// An entity holding a bounded budget to distribute across targets.
///
/// `actual_spent` is owned by the allocation engine and recomputed on every
/// run that touches this allocator. `needs_reallocation` is raised by the
/// registry whenever an input to the engine changes, and cleared only by a
/// run that includes this allocator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Allocator {
    pub id: AllocatorId,
    pub name: String,
    pub total_budget: f64,
    /// Declared intentions, in the order phase 1 consumes them.
    #[serde(default)]
    pub intentions: Vec<CategoryIntention>,
    /// Affinity points per category (each 0..=10, sum at most 10).
    #[serde(default)]
    pub preferences: BTreeMap<Category, u8>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub actual_spent: f64,
    #[serde(default = "default_needs_reallocation")]
    pub needs_reallocation: bool,
}

fn default_needs_reallocation() -> bool {
    true
}

impl Allocator {
    /// Create a dirty allocator with no intentions or preferences.
    pub fn new(id: AllocatorId, name: impl Into<String>, total_budget: f64) -> Self {
        Self {
            id,
            name: name.into(),
            total_budget,
            intentions: Vec::new(),
            preferences: BTreeMap::new(),
            profile: None,
            actual_spent: 0.0,
            needs_reallocation: true,
        }
    }

    pub fn with_intention(mut self, category: impl Into<Category>, amount: f64) -> Self {
        self.intentions.push(CategoryIntention::new(category, amount));
        self
    }

    pub fn with_preference(mut self, category: impl Into<Category>, score: u8) -> Self {
        self.preferences.insert(category.into(), score);
        self
    }

    /// Sum of all declared intentions.
    pub fn intended_total(&self) -> f64 {
        self.intentions.iter().map(|i| i.amount).sum()
    }

    /// Budget not earmarked by any intention.
    pub fn free_budget(&self) -> f64 {
        self.total_budget - self.intended_total()
    }

    /// Budget left after the most recent distribution.
    pub fn remaining_budget(&self) -> f64 {
        self.total_budget - self.actual_spent
    }

    /// Preference score for `category`, 0 when undeclared.
    pub fn preference(&self, category: &Category) -> u8 {
        self.preferences.get(category).copied().unwrap_or(0)
    }

    pub fn preference_total(&self) -> u32 {
        self.preferences.values().map(|s| u32::from(*s)).sum()
    }

    pub fn intention_for(&self, category: &Category) -> Option<f64> {
        self.intentions
            .iter()
            .find(|i| &i.category == category)
            .map(|i| i.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Allocator {
        Allocator::new(AllocatorId(1), "Ana", 1000.0)
            .with_intention("Health", 400.0)
            .with_intention("Education", 250.0)
            .with_preference("Health", 3)
            .with_preference("Roads", 5)
    }

    #[test]
    fn derived_budget_figures() {
        let mut a = sample();
        assert_eq!(a.intended_total(), 650.0);
        assert_eq!(a.free_budget(), 350.0);
        a.actual_spent = 900.0;
        assert_eq!(a.remaining_budget(), 100.0);
    }

    #[test]
    fn preference_defaults_to_zero() {
        let a = sample();
        assert_eq!(a.preference(&Category::new("Roads")), 5);
        assert_eq!(a.preference(&Category::new("Sports")), 0);
        assert_eq!(a.preference_total(), 8);
    }

    #[test]
    fn intentions_keep_declared_order_through_serde() {
        let a = Allocator::new(AllocatorId(7), "Bia", 500.0)
            .with_intention("Zeta", 1.0)
            .with_intention("Alpha", 2.0)
            .with_intention("Mid", 3.0);
        let json = serde_json::to_string(&a).unwrap();
        let restored: Allocator = serde_json::from_str(&json).unwrap();
        let order: Vec<&str> = restored
            .intentions
            .iter()
            .map(|i| i.category.as_str())
            .collect();
        assert_eq!(order, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn missing_engine_fields_get_defaults() {
        let json = r#"{"id": 3, "name": "Caio", "total_budget": 10.0}"#;
        let a: Allocator = serde_json::from_str(json).unwrap();
        assert_eq!(a.id, AllocatorId(3));
        assert_eq!(a.actual_spent, 0.0);
        assert!(a.needs_reallocation);
        assert!(a.intentions.is_empty());
        assert!(a.preferences.is_empty());
    }
}
