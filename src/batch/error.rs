use thiserror::Error;

use crate::mapping::MappingLoadError;
use crate::resolver::ResolveError;
use crate::scoring::ScoringError;

/// Batch failures. All are fatal: no partial report is produced.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Target column absent from the input table. Raised before any other work.
    #[error("column '{column}' not found in input (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Input text is not a table.
    #[error("invalid input table: {reason}")]
    InvalidTable { reason: String },

    #[error("failed to load canonical mapping: {0}")]
    MappingLoad(#[from] MappingLoadError),

    /// Embedding failed while indexing the mapping or resolving a row.
    #[error("resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("change ranking failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("batch cancelled after {processed} rows")]
    Cancelled { processed: usize },
}
