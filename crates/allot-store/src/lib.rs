//! # allot-store
//!
//! Boundary between the allocation engine and durable state.
//!
//! Every load returns a complete collection and every save receives a
//! complete collection; there is no delta or incremental API.
//!
//! - [`JsonFileStore`]: one pretty-printed JSON file per collection, with
//!   atomic writes
//! - [`InMemoryStore`]: process-local, used by tests and embedding callers

#![deny(unsafe_code)]

pub mod error;
pub mod json;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use json::JsonFileStore;
pub use memory::{Collection, InMemoryStore, SaveCounts};
pub use traits::AllocationStore;
