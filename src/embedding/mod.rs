//! Embedding boundary.
//!
//! - [`Embedder`] is the seam the resolver and the change scorer depend on.
//! - [`sentence`] provides a candle-backed sentence encoder (or a deterministic stub).
//! - [`CachedEmbedder`] memoizes vectors per distinct text.

mod bert;
mod cached;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
/// Sentence embedder.
pub mod sentence;
/// Tokenizer/model file helpers.
pub mod utils;


use std::sync::Arc;

pub use cached::CachedEmbedder;
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use sentence::{
    EmbedderKind, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig, SentenceEmbedder,
};

/// Text → fixed-size, unit-normalized vector.
pub trait Embedder: Send + Sync {
    /// Length of every returned vector.
    fn embedding_dim(&self) -> usize;

    /// Encodes one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Encodes many texts, preserving order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// `false` when vectors encode surface form only. Such embedders may rank but must
    /// not drive auto-learning.
    fn is_semantic(&self) -> bool {
        true
    }
}

impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }

    fn is_semantic(&self) -> bool {
        (**self).is_semantic()
    }
}

/// Checks a vector against the embedder's declared dimension.
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), EmbeddingError> {
    if actual != expected {
        return Err(EmbeddingError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
