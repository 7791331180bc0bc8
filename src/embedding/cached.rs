use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use moka::sync::Cache;
use tracing::trace;

use super::{Embedder, EmbeddingError};
use crate::constants::DEFAULT_EMBED_CACHE_CAPACITY;

/// Memoizes embeddings per distinct text.
///
/// Spreadsheet columns repeat the same few hundred titles thousands of times, and the
/// change scorer re-encodes raw and resolved text, so most lookups hit. Failures are
/// never cached.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    entries: Cache<String, Arc<Vec<f32>>>,
}

impl std::fmt::Debug for CachedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder")
            .field("embedding_dim", &self.inner.embedding_dim())
            .field("cached", &self.entries.entry_count())
            .finish()
    }
}

impl CachedEmbedder {
    /// Wraps `inner` with the default capacity.
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self::with_capacity(inner, DEFAULT_EMBED_CACHE_CAPACITY)
    }

    /// Wraps `inner` with a max entry capacity.
    pub fn with_capacity(inner: Arc<dyn Embedder>, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Returns the number of cached vectors (approximate until pending tasks run).
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached vector.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Embedder for CachedEmbedder {
    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }

    fn is_semantic(&self) -> bool {
        self.inner.is_semantic()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Some(hit) = self.entries.get(text) {
            trace!(text, "Embedding cache hit");
            return Ok(hit.as_ref().clone());
        }

        let vector = self.inner.embed(text)?;
        self.entries
            .insert(text.to_string(), Arc::new(vector.clone()));
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let cached: Vec<Option<Vec<f32>>> = texts
            .iter()
            .map(|text| self.entries.get(*text).map(|hit| hit.as_ref().clone()))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let misses: Vec<&str> = texts
            .iter()
            .zip(&cached)
            .filter(|(text, slot)| slot.is_none() && seen.insert(**text))
            .map(|(text, _)| *text)
            .collect();

        let mut computed: HashMap<&str, Vec<f32>> = HashMap::with_capacity(misses.len());
        if !misses.is_empty() {
            trace!(misses = misses.len(), total = texts.len(), "Embedding cache misses");
            let vectors = self.inner.embed_batch(&misses)?;
            if vectors.len() != misses.len() {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!(
                        "embedder returned {} vectors for {} texts",
                        vectors.len(),
                        misses.len()
                    ),
                });
            }
            for (text, vector) in misses.into_iter().zip(vectors) {
                self.entries.insert(text.to_string(), Arc::new(vector.clone()));
                computed.insert(text, vector);
            }
        }

        Ok(cached
            .into_iter()
            .zip(texts)
            .map(|(slot, text)| slot.unwrap_or_else(|| computed[text].clone()))
            .collect())
    }
}
