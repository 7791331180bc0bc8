//! In-memory nearest-neighbour index over mapping keys.
//!
//! Vectors are stored unit-normalized, so cosine similarity is a dot product. The index is
//! built once from a mapping snapshot; whether auto-learned keys are appended later is the
//! resolver's [`IndexPolicy`](crate::resolver::IndexPolicy) decision.


use tracing::{debug, info};

use crate::embedding::{Embedder, EmbeddingError, validate_embedding_dim};

/// Best match returned by [`EmbeddingIndex::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    /// Position in the index.
    pub position: usize,
    /// Mapping key the vector was built from.
    pub key: &'a str,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Parallel `keys` / `vectors` arrays with brute-force cosine search.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    dim: usize,
    keys: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    /// Creates an empty index for vectors of length `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            keys: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Encodes `keys` in one batch call and indexes them in order.
    pub fn build<I, S>(keys: I, embedder: &dyn Embedder) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut index = Self::new(embedder.embedding_dim());

        if keys.is_empty() {
            debug!("Building empty embedding index");
            return Ok(index);
        }

        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let vectors = embedder.embed_batch(&refs)?;
        if vectors.len() != keys.len() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "embedder returned {} vectors for {} keys",
                    vectors.len(),
                    keys.len()
                ),
            });
        }

        for (key, vector) in keys.into_iter().zip(vectors) {
            index.push(key, vector)?;
        }

        info!(entries = index.len(), dim = index.dim, "Embedding index built");
        Ok(index)
    }

    /// Appends a key with its vector (normalized on the way in).
    pub fn push(&mut self, key: impl Into<String>, mut vector: Vec<f32>) -> Result<(), EmbeddingError> {
        validate_embedding_dim(vector.len(), self.dim)?;
        normalize(&mut vector);
        self.keys.push(key.into());
        self.vectors.push(vector);
        Ok(())
    }

    /// Returns the highest-similarity entry; ties keep the earliest position.
    ///
    /// Returns `None` for an empty index.
    pub fn nearest(&self, query: &[f32]) -> Result<Option<Neighbor<'_>>, EmbeddingError> {
        validate_embedding_dim(query.len(), self.dim)?;

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut best: Option<Neighbor<'_>> = None;
        for (position, (key, vector)) in self.keys.iter().zip(&self.vectors).enumerate() {
            let score = dot(&query, vector);
            if best.is_none_or(|b| score > b.score) {
                best = Some(Neighbor {
                    position,
                    key,
                    score,
                });
            }
        }
        Ok(best)
    }

    /// Returns `true` if `key` has a vector.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Indexed keys, in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Vector length.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Scales `vector` to unit length in place; zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = dot(vector, vector).sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product; `0.0` for mismatched lengths.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity for arbitrary (not necessarily normalized) vectors.
///
/// Returns `0.0` for mismatched lengths, empty input, or a zero vector.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
