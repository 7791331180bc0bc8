use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::debug;

use crate::embedding::Embedder;
use crate::index::cosine_similarity;
use crate::text::is_blank;

use super::error::ScoringError;
use super::types::{ChangeRecord, SamplingConfig};

pub struct ChangeScorer {
    embedder: Arc<dyn Embedder>,
    sampling: SamplingConfig,
}

impl std::fmt::Debug for ChangeScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeScorer")
            .field("embedding_dim", &self.embedder.embedding_dim())
            .field("sampling", &self.sampling)
            .finish()
    }
}

impl ChangeScorer {
    pub fn new(embedder: Arc<dyn Embedder>, sampling: SamplingConfig) -> Self {
        Self { embedder, sampling }
    }

    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }

    /// Ranks `(original, normalized)` rows by how much resolution changed them.
    ///
    /// Rows whose original is blank, or whose output is empty, are skipped. Above the
    /// sample size only a seeded sample of rows is scored, so the result approximates the
    /// true top-k. Ties keep input order.
    pub fn rank<O, N>(&self, rows: &[(O, N)], k: usize) -> Result<Vec<ChangeRecord>, ScoringError>
    where
        O: AsRef<str>,
        N: AsRef<str>,
    {
        if k == 0 {
            return Ok(Vec::new());
        }

        let eligible = self.sample_rows(rows);
        if eligible.is_empty() {
            debug!(rows = rows.len(), "No rows eligible for change ranking");
            return Ok(Vec::new());
        }

        let mut texts: Vec<&str> = Vec::with_capacity(eligible.len() * 2);
        texts.extend(eligible.iter().map(|&row| rows[row].0.as_ref()));
        texts.extend(eligible.iter().map(|&row| rows[row].1.as_ref()));

        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(ScoringError::VectorCountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        let (originals, normalized) = vectors.split_at(eligible.len());

        let mut records: Vec<ChangeRecord> = eligible
            .iter()
            .zip(originals.iter().zip(normalized))
            .map(|(&row, (a, b))| ChangeRecord {
                row,
                original: rows[row].0.as_ref().to_string(),
                normalized: rows[row].1.as_ref().to_string(),
                change_score: 1.0 - cosine_similarity(a, b),
            })
            .collect();

        // Stable: equal scores keep row order.
        records.sort_by(|a, b| b.change_score.total_cmp(&a.change_score));
        records.truncate(k);

        debug!(
            rows = rows.len(),
            scored = eligible.len(),
            returned = records.len(),
            "Change ranking complete"
        );
        Ok(records)
    }

    /// Eligible row positions, sampled down to the configured size, ascending.
    fn sample_rows<O, N>(&self, rows: &[(O, N)]) -> Vec<usize>
    where
        O: AsRef<str>,
        N: AsRef<str>,
    {
        let eligible: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, (original, normalized))| {
                !is_blank(original.as_ref()) && !normalized.as_ref().trim().is_empty()
            })
            .map(|(row, _)| row)
            .collect();

        let size = self.sampling.sample_size();
        if eligible.len() <= size {
            return eligible;
        }

        let mut rng = StdRng::seed_from_u64(self.sampling.seed());
        let mut picked = index::sample(&mut rng, eligible.len(), size).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| eligible[i]).collect()
    }
}
