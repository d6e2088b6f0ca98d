//! JSON-file collection store.

use std::path::{Path, PathBuf};

use allot_types::{Allocator, Category, Target};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::AllocationStore;

const ALLOCATORS_FILE: &str = "allocators.json";
const TARGETS_FILE: &str = "targets.json";
const CATEGORIES_FILE: &str = "categories.json";

/// Stores each collection as a JSON array in its own file under `dir`.
///
/// Writes are atomic (write to `.tmp`, then rename). The directory is created
/// on first save. A missing file loads as an empty collection; a malformed
/// one is reported as [`StoreError::Corrupt`] rather than treated as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn allocators_path(&self) -> PathBuf {
        self.dir.join(ALLOCATORS_FILE)
    }

    pub fn targets_path(&self) -> PathBuf {
        self.dir.join(TARGETS_FILE)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.dir.join(CATEGORIES_FILE)
    }

    fn load_json<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Store file could not be parsed");
            StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    fn save_json<T: Serialize>(&self, path: &Path, items: &[T]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        std::fs::create_dir_all(&self.dir)?;

        // Atomic write: write to .tmp then rename
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;

        debug!(path = %path.display(), records = items.len(), "Collection saved");
        Ok(())
    }
}

impl AllocationStore for JsonFileStore {
    fn load_allocators(&self) -> StoreResult<Vec<Allocator>> {
        self.load_json(&self.allocators_path())
    }

    fn load_targets(&self) -> StoreResult<Vec<Target>> {
        self.load_json(&self.targets_path())
    }

    fn load_categories(&self) -> StoreResult<Vec<Category>> {
        self.load_json(&self.categories_path())
    }

    fn save_allocators(&self, allocators: &[Allocator]) -> StoreResult<()> {
        self.save_json(&self.allocators_path(), allocators)
    }

    fn save_targets(&self, targets: &[Target]) -> StoreResult<()> {
        self.save_json(&self.targets_path(), targets)
    }

    fn save_categories(&self, categories: &[Category]) -> StoreResult<()> {
        self.save_json(&self.categories_path(), categories)
    }
}
