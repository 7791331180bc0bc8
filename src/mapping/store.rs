use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::CanonicalMapping;
use super::error::{MappingLoadError, PersistenceError};
use crate::storage::{read_json, write_json_atomic};

/// Load/persist lifecycle of the canonical mapping.
///
/// `persist` always receives the complete mapping; implementations replace, never merge.
pub trait MappingStore: Send + Sync {
    /// Loads the full mapping.
    fn load(&self) -> Result<CanonicalMapping, MappingLoadError>;

    /// Replaces the stored mapping with `mapping`.
    fn persist(&self, mapping: &CanonicalMapping) -> Result<(), PersistenceError>;
}

/// A UTF-8 JSON object file (`{"variant": "Canonical", ...}`).
#[derive(Debug, Clone)]
pub struct JsonMappingStore {
    path: PathBuf,
}

impl JsonMappingStore {
    /// Creates a store for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingStore for JsonMappingStore {
    fn load(&self) -> Result<CanonicalMapping, MappingLoadError> {
        let raw: BTreeMap<String, String> = read_json(&self.path)
            .map_err(|e| MappingLoadError::from_storage(self.path.clone(), e))?;
        let raw_len = raw.len();

        let mapping = CanonicalMapping::from_raw_entries(raw);

        info!(
            path = %self.path.display(),
            entries = mapping.len(),
            dropped = raw_len - mapping.len(),
            "Canonical mapping loaded"
        );
        Ok(mapping)
    }

    fn persist(&self, mapping: &CanonicalMapping) -> Result<(), PersistenceError> {
        write_json_atomic(&self.path, mapping).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            entries = mapping.len(),
            "Canonical mapping persisted"
        );
        Ok(())
    }
}
