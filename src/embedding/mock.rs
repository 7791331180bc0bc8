use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{Embedder, EmbeddingError};
use crate::index::normalize;

/// Table-driven embedder for tests.
///
/// Registered texts return their (normalized) vector. Anything else maps to the last axis,
/// which registered vectors are expected to leave at zero, giving cosine `0.0` against
/// every registered text.
#[derive(Debug)]
pub struct MockEmbedder {
    dim: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockEmbedder {
    /// Creates an empty table with vectors of length `dim` (at least 2).
    pub fn new(dim: usize) -> Self {
        Self {
            dim: dim.max(2),
            vectors: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Registers `text → vector`, zero-padding or truncating to the table dimension.
    pub fn with_vector(self, text: &str, vector: &[f32]) -> Self {
        self.insert(text, vector);
        self
    }

    /// Registers `text → vector` on a shared instance.
    pub fn insert(&self, text: &str, vector: &[f32]) {
        let mut padded = vec![0.0; self.dim];
        for (slot, value) in padded.iter_mut().zip(vector) {
            *slot = *value;
        }
        normalize(&mut padded);
        self.vectors.write().insert(text.to_string(), padded);
    }

    /// Number of texts encoded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resets the call counter.
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Makes every subsequent call fail with [`EmbeddingError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn unknown_vector(&self) -> Vec<f32> {
        let mut vector = vec![0.0; self.dim];
        vector[self.dim - 1] = 1.0;
        vector
    }
}

impl Embedder for MockEmbedder {
    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Unavailable {
                reason: "mock embedder set to fail".to_string(),
            });
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .vectors
            .read()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.unknown_vector()))
    }
}
