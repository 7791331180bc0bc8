//! Title resolution cascade.
//!
//! Each stage can terminate resolution:
//!
//! 1. sanitize: placeholder cells end as [`Confidence::Blank`]
//! 2. direct lookup of the sanitized text
//! 3. rule correction, then fuzzy substitution against mapping keys, then exact lookup
//! 4. nearest neighbour in the embedding index, classified by [`Thresholds`]
//!
//! An auto-learned variant is written into the shared mapping and persisted before
//! `resolve` returns. Embedders that are not semantic never learn: a match above the
//! auto-learn bar is reported as [`Confidence::Accepted`] instead. Mapping and index share one lock; the write lock is held across the
//! persist so concurrent learn events are serialized.

pub mod error;
pub mod types;


pub use error::ResolveError;
pub use types::{Confidence, IndexPolicy, ResolutionResult, ResolverConfig, Thresholds};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::embedding::Embedder;
use crate::fuzzy::FuzzyMatcher;
use crate::index::EmbeddingIndex;
use crate::mapping::{CanonicalMapping, MappingStore};
use crate::text::{RuleCorrector, Sanitized, sanitize};

struct ResolverState {
    mapping: CanonicalMapping,
    index: EmbeddingIndex,
}

/// Resolves raw job titles to canonical titles, learning confident new variants.
///
/// The resolver owns no I/O of its own: it receives an already-loaded mapping, an
/// embedder, and the store that auto-learn events are persisted into.
pub struct TitleResolver {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn MappingStore>,
    rules: RuleCorrector,
    fuzzy: FuzzyMatcher,
    config: ResolverConfig,
    learning: bool,
    state: RwLock<ResolverState>,
    learned: AtomicUsize,
    persistence_failures: AtomicUsize,
}

impl std::fmt::Debug for TitleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("TitleResolver")
            .field("config", &self.config)
            .field("learning", &self.learning)
            .field("rules", &self.rules.rules().len())
            .field("mapping_entries", &state.mapping.len())
            .field("index_entries", &state.index.len())
            .finish()
    }
}

impl TitleResolver {
    /// Builds the embedding index over every mapping key (one batch call).
    pub fn new(
        mapping: CanonicalMapping,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn MappingStore>,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        let index = EmbeddingIndex::build(mapping.keys(), embedder.as_ref())?;
        let learning = embedder.is_semantic();
        if !learning {
            warn!("Embedder is not semantic; auto-learning disabled for this run");
        }

        info!(
            entries = mapping.len(),
            similarity = config.thresholds.similarity(),
            auto_learn = config.thresholds.auto_learn(),
            fuzzy_cutoff = config.fuzzy_cutoff,
            index_policy = %config.index_policy,
            "Title resolver ready"
        );

        Ok(Self {
            embedder,
            store,
            rules: RuleCorrector::default(),
            fuzzy: FuzzyMatcher::new(config.fuzzy_cutoff),
            config,
            learning,
            state: RwLock::new(ResolverState { mapping, index }),
            learned: AtomicUsize::new(0),
            persistence_failures: AtomicUsize::new(0),
        })
    }

    /// Replaces the default correction rules.
    pub fn with_rules(mut self, rules: RuleCorrector) -> Self {
        self.rules = rules;
        self
    }

    /// Resolves one raw cell.
    ///
    /// Fails only when the embedder fails; a failed auto-learn write is logged and counted
    /// but the row result stands.
    pub fn resolve(&self, raw: &str) -> Result<ResolutionResult, ResolveError> {
        let Sanitized::Text(sanitized) = sanitize(raw) else {
            return Ok(ResolutionResult::blank(raw));
        };

        let normalized = {
            let state = self.state.read();

            if let Some(canonical) = state.mapping.get(&sanitized) {
                return Ok(dictionary_hit(raw, &sanitized, canonical, Confidence::ExactDictionary, 1.0));
            }

            let corrected = self.rules.correct(&sanitized);
            let correction = self.fuzzy.correct(&corrected, state.mapping.keys());

            let Sanitized::Text(normalized) = sanitize(&correction.text) else {
                debug!(raw, corrected = %corrected, "Correction produced a blank token");
                return Ok(ResolutionResult::blank(raw));
            };

            if let Some(canonical) = state.mapping.get(&normalized) {
                let (confidence, score) = match correction.score {
                    Some(score) if correction.text != corrected => {
                        (Confidence::Fuzzy, f32::from(score) / 100.0)
                    }
                    _ => (Confidence::ExactDictionary, 1.0),
                };
                return Ok(dictionary_hit(raw, &normalized, canonical, confidence, score));
            }

            normalized
        };

        self.resolve_by_embedding(raw, normalized)
    }

    fn resolve_by_embedding(&self, raw: &str, normalized: String) -> Result<ResolutionResult, ResolveError> {
        let query = self.embedder.embed(&normalized)?;

        let nearest = {
            let state = self.state.read();
            state.index.nearest(&query)?.and_then(|hit| {
                state
                    .mapping
                    .get(hit.key)
                    .map(|canonical| (hit.key.to_string(), canonical.to_string(), hit.score))
            })
        };

        let Some((key, canonical, score)) = nearest else {
            debug!(normalized = %normalized, "Embedding index is empty");
            return Ok(ResolutionResult::unknown(raw, normalized, None));
        };

        let confidence = match self.config.thresholds.classify(score) {
            Confidence::AutoLearned if !self.learning => Confidence::Accepted,
            confidence => confidence,
        };
        debug!(
            normalized = %normalized,
            nearest = %key,
            score,
            confidence = %confidence,
            "Embedding stage decision"
        );

        match confidence {
            Confidence::AutoLearned => {
                self.learn(&normalized, &canonical, query)?;
            }
            Confidence::Accepted => {}
            _ => return Ok(ResolutionResult::unknown(raw, normalized, Some(score))),
        }

        Ok(ResolutionResult {
            raw: raw.to_string(),
            normalized: Some(normalized),
            canonical,
            confidence,
            score: Some(score),
            matched_key: Some(key),
        })
    }

    fn learn(&self, key: &str, canonical: &str, vector: Vec<f32>) -> Result<(), ResolveError> {
        let mut state = self.state.write();

        // Another caller learned the same variant between our read and write locks.
        if state.mapping.contains_key(key) {
            return Ok(());
        }

        if self.config.index_policy == IndexPolicy::Incremental {
            state.index.push(key, vector)?;
        }
        state.mapping.insert(key, canonical);
        self.learned.fetch_add(1, Ordering::Relaxed);

        info!(variant = key, canonical, "Learned new title variant");

        if let Err(err) = self.store.persist(&state.mapping) {
            self.persistence_failures.fetch_add(1, Ordering::Relaxed);
            warn!(error = %err, variant = key, "Auto-learned variant was not persisted");
        }
        Ok(())
    }

    /// Copy of the current mapping, learned variants included.
    pub fn mapping(&self) -> CanonicalMapping {
        self.state.read().mapping.clone()
    }

    /// Number of mapping entries.
    pub fn mapping_len(&self) -> usize {
        self.state.read().mapping.len()
    }

    /// Number of indexed vectors.
    pub fn index_len(&self) -> usize {
        self.state.read().index.len()
    }

    /// `false` when the embedder cannot drive auto-learning.
    pub fn learning_enabled(&self) -> bool {
        self.learning
    }

    /// Variants learned since construction.
    pub fn auto_learned(&self) -> usize {
        self.learned.load(Ordering::Relaxed)
    }

    /// Auto-learn writes that failed.
    pub fn persistence_failures(&self) -> usize {
        self.persistence_failures.load(Ordering::Relaxed)
    }

    /// `false` once any auto-learn write has failed.
    pub fn mapping_fully_persisted(&self) -> bool {
        self.persistence_failures() == 0
    }

    /// Active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Correction rules in application order.
    pub fn rules(&self) -> &RuleCorrector {
        &self.rules
    }

    /// The embedder used for queries.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}

fn dictionary_hit(raw: &str, key: &str, canonical: &str, confidence: Confidence, score: f32) -> ResolutionResult {
    ResolutionResult {
        raw: raw.to_string(),
        normalized: Some(key.to_string()),
        canonical: canonical.to_string(),
        confidence,
        score: Some(score),
        matched_key: Some(key.to_string()),
    }
}
