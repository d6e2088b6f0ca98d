//! # allot-types
//!
//! Passive records shared by every Allot crate:
//!
//! - **Allocator**: a bounded budget, with declared per-category intentions
//!   and preference scores used to rank leftover funds
//! - **Target**: a funding request of a fixed size in a single category,
//!   carrying its own contribution ledger
//! - **Contribution**: one allocator's share of a target, split into the
//!   part that came from a declared intention and the part that came from
//!   free funds
//!
//! ## Ledger Invariants
//!
//! After any engine run, within [`AMOUNT_EPSILON`]:
//!
//! - `target.funded_amount == sum(target.contributions[*].total)`
//! - `allocator.actual_spent == sum over targets of contributions[allocator.id].total`
//! - no contribution amount is negative

#![deny(unsafe_code)]

pub mod allocator;
pub mod amount;
pub mod category;
pub mod ids;
pub mod target;

pub use allocator::{Allocator, CategoryIntention, MAX_PREFERENCE_POINTS};
pub use amount::{approx_eq, is_positive, AMOUNT_EPSILON};
pub use category::Category;
pub use ids::{AllocatorId, TargetId};
pub use target::{Contribution, FundingStatus, Target};
