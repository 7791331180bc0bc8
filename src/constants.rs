//! Cross-cutting, shared constants.
//!
//! # Threshold Invariants
//!
//! The resolver cascade is monotone only if the auto-learn bar sits at or above the
//! acceptance bar. The defaults are checked at compile time below; configured values are
//! checked at runtime by [`Thresholds::new`](crate::resolver::Thresholds::new).

/// Cosine similarity at or above which a nearest-neighbour match is accepted.
pub const SIMILARITY_THRESHOLD: f32 = 0.75;

/// Cosine similarity at or above which a match is accepted *and* learned into the mapping.
pub const AUTO_LEARN_THRESHOLD: f32 = 0.88;

const _: () = assert!(AUTO_LEARN_THRESHOLD >= SIMILARITY_THRESHOLD);

/// Minimum fuzzy ratio (0-100) for a fuzzy substitution.
pub const FUZZY_SCORE_CUTOFF: u8 = 85;

/// Canonical title assigned when no stage produces a confident match.
pub const UNKNOWN_TITLE: &str = "Unknown - Needs Review";

/// Sanitized tokens that mark a cell as blank.
pub const BLANK_TOKENS: &[&str] = &["", "-", "_", "nan", "none", "null", "n/a", "na"];

/// Default embedding dimension (all-MiniLM-L6-v2 class sentence encoders).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Max tokens fed to the sentence encoder. Job titles are short; this only bounds outliers.
pub const DEFAULT_MAX_SEQ_LEN: usize = 128;

/// Upper bound on rows embedded by the change scorer.
pub const DEFAULT_SAMPLE_SIZE: usize = 500;

/// Seed for the change scorer's row sample.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Number of most-changed rows surfaced for review.
pub const DEFAULT_REVIEW_TOP_K: usize = 20;

/// Default embedding memo capacity (distinct strings).
pub const DEFAULT_EMBED_CACHE_CAPACITY: u64 = 10_000;

/// Default mapping file name, relative to the working directory.
pub const DEFAULT_MAPPING_FILENAME: &str = "canonical_mapping_raw.json";

/// Default title column in the input table.
pub const DEFAULT_TARGET_COLUMN: &str = "Designation*";

/// Name of the column the batch driver appends.
pub const STANDARDIZED_COLUMN: &str = "Standardized Title";
