use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Resolution failure. Only the embedding stage can fail; there is no fallback.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("embedding service error: {0}")]
    Embedding(#[from] EmbeddingError),
}
