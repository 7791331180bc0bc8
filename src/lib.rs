//! Title-norm library crate (used by the `titlenorm` binary and integration tests).
//!
//! Resolves free-text job titles to a canonical vocabulary through a confidence cascade:
//! placeholder detection, rule correction, fuzzy matching, dictionary lookup, and finally
//! embedding similarity. Confident semantic matches are learned back into the dictionary.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`TitleResolver`], [`ResolutionResult`], [`Confidence`] - The resolution cascade
//! - [`Thresholds`], [`IndexPolicy`], [`ResolverConfig`] - Resolver tunables
//! - [`format_title`], [`sanitize`], [`RuleCorrector`], [`FuzzyMatcher`] - Text stages
//!
//! ## Dictionary
//! - [`CanonicalMapping`] - Variant key → canonical title
//! - [`MappingStore`], [`JsonMappingStore`] - Load/persist lifecycle
//!
//! ## Embedding
//! - [`Embedder`] - Text → unit vector boundary
//! - [`SentenceEmbedder`], [`SentenceConfig`] - candle sentence encoder (or stub)
//! - [`CachedEmbedder`] - Per-text memo
//! - [`EmbeddingIndex`] - Brute-force cosine search over mapping keys
//!
//! ## Batch & Review
//! - [`BatchDriver`], [`BatchRequest`], [`BatchReport`], [`InputTable`] - Column-level runs
//! - [`ChangeScorer`], [`ChangeRecord`] - Sampled most-changed rows
//!
//! ## Test/Mock Support
//! [`MockEmbedder`] and [`MemoryMappingStore`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod batch;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod fuzzy;
pub mod index;
pub mod mapping;
pub mod resolver;
pub mod scoring;
pub mod storage;
pub mod text;

pub use batch::{
    BatchDriver, BatchError, BatchReport, BatchRequest, CancelFlag, ClassificationCounts,
    InputTable, NoProgress, ProgressObserver, RunSummary,
};
pub use config::{Config, ConfigError};
pub use constants::{AUTO_LEARN_THRESHOLD, SIMILARITY_THRESHOLD, STANDARDIZED_COLUMN, UNKNOWN_TITLE};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{
    CachedEmbedder, Embedder, EmbedderKind, EmbeddingError, SentenceConfig, SentenceEmbedder,
    validate_embedding_dim,
};
pub use fuzzy::{FuzzyCorrection, FuzzyMatch, FuzzyMatcher};
pub use index::{EmbeddingIndex, Neighbor, cosine_similarity};
#[cfg(any(test, feature = "mock"))]
pub use mapping::MemoryMappingStore;
pub use mapping::{
    CanonicalMapping, JsonMappingStore, MappingLoadError, MappingStore, PersistenceError,
};
pub use resolver::{
    Confidence, IndexPolicy, ResolutionResult, ResolveError, ResolverConfig, Thresholds,
    TitleResolver,
};
pub use scoring::{ChangeRecord, ChangeScorer, SamplingConfig, ScoringError};
pub use storage::StorageError;
pub use text::{RuleCorrector, Sanitized, format_title, sanitize};
