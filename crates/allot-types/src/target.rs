use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::amount::{approx_eq, AMOUNT_EPSILON};
use crate::category::Category;
use crate::ids::{AllocatorId, TargetId};

/// One allocator's share of a target.
///
/// `total` always equals `from_intention + from_free`; both parts only grow
/// through [`Contribution::add_intention`] and [`Contribution::add_free`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub total: f64,
    pub from_intention: f64,
    pub from_free: f64,
}

impl Contribution {
    pub fn add_intention(&mut self, amount: f64) {
        self.from_intention += amount;
        self.total += amount;
    }

    pub fn add_free(&mut self, amount: f64) {
        self.from_free += amount;
        self.total += amount;
    }
}

/// Funding state of a target, as reported to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingStatus {
    Funded,
    PartiallyFunded,
    Unfunded,
}

impl std::fmt::Display for FundingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FundingStatus::Funded => "funded",
            FundingStatus::PartiallyFunded => "partially funded",
            FundingStatus::Unfunded => "unfunded",
        };
        write!(f, "{}", label)
    }
}

/// A funding request needing a fixed amount to be satisfied.
///
/// `funded_amount` and `contributions` are owned by the allocation engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub description: String,
    pub required_amount: f64,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub funded_amount: f64,
    #[serde(default)]
    pub contributions: BTreeMap<AllocatorId, Contribution>,
}

impl Target {
    pub fn new(
        id: TargetId,
        description: impl Into<String>,
        required_amount: f64,
        category: impl Into<Category>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            required_amount,
            category: category.into(),
            funded_amount: 0.0,
            contributions: BTreeMap::new(),
        }
    }

    /// Amount still needed, floored at zero.
    pub fn remaining_need(&self) -> f64 {
        (self.required_amount - self.funded_amount).max(0.0)
    }

    pub fn is_fully_funded(&self) -> bool {
        self.funded_amount > self.required_amount
            || approx_eq(self.funded_amount, self.required_amount)
    }

    pub fn funding_status(&self) -> FundingStatus {
        if self.is_fully_funded() {
            FundingStatus::Funded
        } else if self.funded_amount > AMOUNT_EPSILON {
            FundingStatus::PartiallyFunded
        } else {
            FundingStatus::Unfunded
        }
    }

    pub fn contribution(&self, allocator: AllocatorId) -> Option<&Contribution> {
        self.contributions.get(&allocator)
    }

    /// Sum of every ledger entry's total.
    pub fn ledger_total(&self) -> f64 {
        self.contributions.values().map(|c| c.total).sum()
    }

    /// Record an intention-phase contribution from `allocator`.
    pub fn credit_intention(&mut self, allocator: AllocatorId, amount: f64) {
        self.funded_amount += amount;
        self.contributions
            .entry(allocator)
            .or_default()
            .add_intention(amount);
    }

    /// Record a free-fund contribution from `allocator`.
    pub fn credit_free(&mut self, allocator: AllocatorId, amount: f64) {
        self.funded_amount += amount;
        self.contributions.entry(allocator).or_default().add_free(amount);
    }

    /// Remove `allocator`'s ledger entry, subtracting its total from the
    /// funded amount (floored at zero). Other entries are untouched.
    pub fn withdraw(&mut self, allocator: AllocatorId) -> Option<Contribution> {
        let removed = self.contributions.remove(&allocator)?;
        self.funded_amount = (self.funded_amount - removed.total).max(0.0);
        Some(removed)
    }

    /// Drop every ledger entry.
    pub fn clear_funding(&mut self) {
        self.funded_amount = 0.0;
        self.contributions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(required: f64) -> Target {
        Target::new(TargetId(1), "Clinic", required, "Health")
    }

    #[test]
    fn credits_accumulate_into_one_entry() {
        let mut t = target(500.0);
        t.credit_intention(AllocatorId(1), 300.0);
        t.credit_free(AllocatorId(1), 50.0);
        t.credit_free(AllocatorId(2), 25.0);

        let c = t.contribution(AllocatorId(1)).unwrap();
        assert_eq!(c.total, 350.0);
        assert_eq!(c.from_intention, 300.0);
        assert_eq!(c.from_free, 50.0);
        assert_eq!(t.funded_amount, 375.0);
        assert_eq!(t.ledger_total(), t.funded_amount);
        assert_eq!(t.remaining_need(), 125.0);
    }

    #[test]
    fn withdraw_is_idempotent_and_isolated() {
        let mut t = target(500.0);
        t.credit_intention(AllocatorId(1), 100.0);
        t.credit_free(AllocatorId(2), 200.0);

        assert!(t.withdraw(AllocatorId(1)).is_some());
        assert!(t.withdraw(AllocatorId(1)).is_none());
        assert_eq!(t.funded_amount, 200.0);
        assert_eq!(t.contribution(AllocatorId(2)).unwrap().total, 200.0);
    }

    #[test]
    fn withdraw_floors_at_zero() {
        let mut t = target(500.0);
        t.credit_free(AllocatorId(1), 100.0);
        t.funded_amount = 40.0;
        t.withdraw(AllocatorId(1));
        assert_eq!(t.funded_amount, 0.0);
    }

    #[test]
    fn funding_status_uses_tolerance() {
        let mut t = target(0.3);
        assert_eq!(t.funding_status(), FundingStatus::Unfunded);
        t.credit_free(AllocatorId(1), 0.1);
        assert_eq!(t.funding_status(), FundingStatus::PartiallyFunded);
        t.credit_free(AllocatorId(1), 0.2);
        assert_eq!(t.funding_status(), FundingStatus::Funded);
    }

    #[test]
    fn ledger_keys_survive_json() {
        let mut t = target(100.0);
        t.credit_free(AllocatorId(42), 10.0);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"42\""));
        let restored: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.contribution(AllocatorId(42)).unwrap().from_free, 10.0);
    }
}
