//! # allot-registry
//!
//! Owns the allocator, target and category collections between engine runs
//! and is the only place they are created, updated or deleted.
//!
//! ## Reallocation Tracking
//!
//! Every mutation that changes an input of the allocation engine raises
//! `needs_reallocation` on the affected allocators:
//!
//! - budget, intention or preference change → that allocator
//! - target created or deleted → every allocator
//! - allocator deleted → every remaining allocator
//!
//! Only an engine run that includes an allocator clears its flag.

#![deny(unsafe_code)]

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{AllocatorUpdate, Registry};
