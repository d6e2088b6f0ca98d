use allot_engine::EngineError;
use allot_store::StoreError;
use allot_types::{AllocatorId, Category, TargetId};
use thiserror::Error;

/// Errors from registry mutations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("allocator not found: {0}")]
    AllocatorNotFound(AllocatorId),

    #[error("target not found: {0}")]
    TargetNotFound(TargetId),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("category already exists: {0}")]
    DuplicateCategory(Category),

    #[error("category {category} is in use: {reason}")]
    CategoryInUse { category: Category, reason: String },

    #[error("invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("intentions total {intended:.2} exceeds budget {budget:.2}")]
    IntentionsExceedBudget { intended: f64, budget: f64 },

    #[error("intention declared twice for category {0}")]
    DuplicateIntention(Category),

    #[error("preference declared twice for category {0}")]
    DuplicatePreference(Category),

    #[error("preference score {score} for {category} is out of range 0..=10")]
    InvalidPreference { category: Category, score: u32 },

    #[error("preference points total {total} exceeds limit {limit}")]
    PreferencesExceedLimit { total: u32, limit: u32 },

    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Convenience type alias for registry results.
pub type RegistryResult<T> = Result<T, RegistryError>;
