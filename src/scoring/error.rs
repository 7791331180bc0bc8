use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedder returned {actual} vectors for {expected} texts")]
    VectorCountMismatch { expected: usize, actual: usize },
}
