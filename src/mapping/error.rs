use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

/// The mapping could not be loaded. Fatal: no rows are processed.
#[derive(Debug, Error)]
pub enum MappingLoadError {
    #[error("canonical mapping not found at {path}")]
    NotFound { path: PathBuf },

    #[error("canonical mapping at {path} is unreadable: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("canonical mapping at {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// An auto-learn write failed. The in-memory mapping and the row result stay valid.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to persist canonical mapping to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("mapping store rejected write: {reason}")]
    Rejected { reason: String },
}

impl MappingLoadError {
    pub(crate) fn from_storage(path: PathBuf, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => MappingLoadError::NotFound { path },
            StorageError::Malformed { source, .. } => MappingLoadError::Malformed {
                path,
                reason: source.to_string(),
            },
            other => MappingLoadError::Unreadable {
                path,
                reason: other.to_string(),
            },
        }
    }
}
