//! # allot-engine
//!
//! Turns allocator budgets, declared intentions and preference scores into
//! concrete per-target contributions. The engine is a single-pass greedy
//! heuristic: deterministic, explainable, never globally optimal.
//!
//! ## Pipeline
//!
//! ```text
//!   Store ──load──▶ caller-owned Vec<Allocator>, Vec<Target>
//!                              │
//!                 ┌────────────┴────────────┐
//!                 │ reset                   │  full: clear every ledger
//!                 │                         │  partial: withdraw selected ids
//!                 └────────────┬────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ phase 1: intentions     │  declared order, smallest need first
//!                 └────────────┬────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ phase 2: free funds     │  (partially funded, preference, size) desc
//!                 └────────────┬────────────┘
//!                              ▼
//!                 clear dirty flags ──save──▶ Store (full collections)
//! ```
//!
//! ## Concurrency
//!
//! Runs mutate the caller's collections in place and must not overlap.
//! [`RedistributionGate`] serializes runs behind one lock held for the whole
//! call.

#![deny(unsafe_code)]

pub mod distribute;
pub mod engine;
pub mod error;
pub mod gate;
pub mod reset;
pub mod verify;

pub use distribute::{distribute, DistributionTotals};
pub use engine::{AllocationEngine, RedistributionOutcome, RedistributionScope, RedistributionStatus};
pub use error::{EngineError, EngineResult};
pub use gate::{AllocationState, RedistributionGate};
pub use reset::{reset_all, reset_for_allocator};
pub use verify::{verify_ledger, LedgerViolation};
