//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TITLENORM_*` environment variables.
//! Thresholds and cutoffs that fail to parse are errors, never silently defaulted.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::batch::BatchRequest;
use crate::constants::{
    AUTO_LEARN_THRESHOLD, DEFAULT_EMBED_CACHE_CAPACITY, DEFAULT_MAPPING_FILENAME,
    DEFAULT_REVIEW_TOP_K, DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE, DEFAULT_TARGET_COLUMN,
    FUZZY_SCORE_CUTOFF, SIMILARITY_THRESHOLD,
};
use crate::embedding::{EmbedderKind, SentenceConfig};
use crate::resolver::{IndexPolicy, ResolverConfig, Thresholds};
use crate::scoring::SamplingConfig;

/// Run configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TITLENORM_*` overrides on top of defaults, then
/// [`Config::validate`] before building anything from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Persisted canonical mapping. Default: `canonical_mapping_raw.json`.
    pub mapping_path: PathBuf,

    /// Sentence-embedding model directory. Required for [`EmbedderKind::Model`].
    pub model_path: Option<PathBuf>,

    /// Encoder backing the run. Default: model. The stub is opt-in and never auto-learns.
    pub embedder: EmbedderKind,

    /// Accepted floor. Default: `0.75`.
    pub similarity_threshold: f32,

    /// AutoLearned floor. Default: `0.88`.
    pub auto_learn_threshold: f32,

    /// Fuzzy ratio floor, `0..=100`. Default: `85`.
    pub fuzzy_cutoff: u32,

    /// Index behaviour on auto-learn. Default: snapshot.
    pub index_policy: IndexPolicy,

    /// Rows embedded by the change scorer. Default: `500`.
    pub sample_size: usize,

    /// Change scorer sample seed. Default: `42`.
    pub sample_seed: u64,

    /// Change records returned; `0` disables ranking. Default: `20`.
    pub review_top_k: usize,

    /// Title column. Default: `Designation*`.
    pub target_column: String,

    /// Optional department column for grouping.
    pub department_column: Option<String>,

    /// Where to write the department grouping JSON.
    pub department_output: Option<PathBuf>,

    /// Where to write the run report JSON.
    pub report_path: Option<PathBuf>,

    /// Embedding memo capacity. Default: `10_000`.
    pub embed_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapping_path: PathBuf::from(DEFAULT_MAPPING_FILENAME),
            model_path: None,
            embedder: EmbedderKind::default(),
            similarity_threshold: SIMILARITY_THRESHOLD,
            auto_learn_threshold: AUTO_LEARN_THRESHOLD,
            fuzzy_cutoff: u32::from(FUZZY_SCORE_CUTOFF),
            index_policy: IndexPolicy::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_seed: DEFAULT_SAMPLE_SEED,
            review_top_k: DEFAULT_REVIEW_TOP_K,
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            department_column: None,
            department_output: None,
            report_path: None,
            embed_cache_capacity: DEFAULT_EMBED_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_MAPPING_PATH: &'static str = "TITLENORM_MAPPING_PATH";
    const ENV_MODEL_PATH: &'static str = SentenceConfig::ENV_MODEL_PATH;
    const ENV_EMBEDDER: &'static str = SentenceConfig::ENV_EMBEDDER;
    const ENV_SIMILARITY_THRESHOLD: &'static str = "TITLENORM_SIMILARITY_THRESHOLD";
    const ENV_AUTO_LEARN_THRESHOLD: &'static str = "TITLENORM_AUTO_LEARN_THRESHOLD";
    const ENV_FUZZY_CUTOFF: &'static str = "TITLENORM_FUZZY_CUTOFF";
    const ENV_INDEX_POLICY: &'static str = "TITLENORM_INDEX_POLICY";
    const ENV_SAMPLE_SIZE: &'static str = "TITLENORM_SAMPLE_SIZE";
    const ENV_SAMPLE_SEED: &'static str = "TITLENORM_SAMPLE_SEED";
    const ENV_REVIEW_TOP_K: &'static str = "TITLENORM_REVIEW_TOP_K";
    const ENV_TARGET_COLUMN: &'static str = "TITLENORM_TARGET_COLUMN";
    const ENV_DEPARTMENT_COLUMN: &'static str = "TITLENORM_DEPARTMENT_COLUMN";
    const ENV_DEPARTMENT_OUTPUT: &'static str = "TITLENORM_DEPARTMENT_OUTPUT";
    const ENV_REPORT_PATH: &'static str = "TITLENORM_REPORT_PATH";
    const ENV_EMBED_CACHE_CAPACITY: &'static str = "TITLENORM_EMBED_CACHE_CAPACITY";

    /// Every variable [`Config::from_env`] reads.
    pub const ENV_VARS: [&'static str; 15] = [
        Self::ENV_MAPPING_PATH,
        Self::ENV_MODEL_PATH,
        Self::ENV_EMBEDDER,
        Self::ENV_SIMILARITY_THRESHOLD,
        Self::ENV_AUTO_LEARN_THRESHOLD,
        Self::ENV_FUZZY_CUTOFF,
        Self::ENV_INDEX_POLICY,
        Self::ENV_SAMPLE_SIZE,
        Self::ENV_SAMPLE_SEED,
        Self::ENV_REVIEW_TOP_K,
        Self::ENV_TARGET_COLUMN,
        Self::ENV_DEPARTMENT_COLUMN,
        Self::ENV_DEPARTMENT_OUTPUT,
        Self::ENV_REPORT_PATH,
        Self::ENV_EMBED_CACHE_CAPACITY,
    ];

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let index_policy = match Self::parse_optional_string_from_env(Self::ENV_INDEX_POLICY) {
            Some(value) => value.parse()?,
            None => defaults.index_policy,
        };
        let embedder = match Self::parse_optional_string_from_env(Self::ENV_EMBEDDER) {
            Some(value) => value.parse()?,
            None => defaults.embedder,
        };

        Ok(Self {
            mapping_path: Self::parse_path_from_env(Self::ENV_MAPPING_PATH, defaults.mapping_path),
            model_path: Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH),
            embedder,
            similarity_threshold: Self::parse_number_from_env(
                Self::ENV_SIMILARITY_THRESHOLD,
                defaults.similarity_threshold,
            )?,
            auto_learn_threshold: Self::parse_number_from_env(
                Self::ENV_AUTO_LEARN_THRESHOLD,
                defaults.auto_learn_threshold,
            )?,
            fuzzy_cutoff: Self::parse_number_from_env(Self::ENV_FUZZY_CUTOFF, defaults.fuzzy_cutoff)?,
            index_policy,
            sample_size: Self::parse_number_from_env(Self::ENV_SAMPLE_SIZE, defaults.sample_size)?,
            sample_seed: Self::parse_number_from_env(Self::ENV_SAMPLE_SEED, defaults.sample_seed)?,
            review_top_k: Self::parse_number_from_env(Self::ENV_REVIEW_TOP_K, defaults.review_top_k)?,
            target_column: Self::parse_optional_string_from_env(Self::ENV_TARGET_COLUMN)
                .unwrap_or(defaults.target_column),
            department_column: Self::parse_optional_string_from_env(Self::ENV_DEPARTMENT_COLUMN),
            department_output: Self::parse_optional_path_from_env(Self::ENV_DEPARTMENT_OUTPUT),
            report_path: Self::parse_optional_path_from_env(Self::ENV_REPORT_PATH),
            embed_cache_capacity: Self::parse_number_from_env(
                Self::ENV_EMBED_CACHE_CAPACITY,
                defaults.embed_cache_capacity,
            )?,
        })
    }

    /// Checks threshold ranges and ordering, the fuzzy cutoff, positive counts, and that
    /// a model directory is set unless the stub was requested.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver_config()?;
        self.sampling()?;

        if self.embedder == EmbedderKind::Model && self.model_path.is_none() {
            return Err(ConfigError::MissingModelPath {
                name: Self::ENV_MODEL_PATH,
                opt_in: Self::ENV_EMBEDDER,
            });
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: "target column",
            });
        }
        if self.embed_cache_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                name: "embedding cache capacity",
            });
        }
        Ok(())
    }

    /// Validated resolver tunables.
    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        let thresholds = Thresholds::new(self.similarity_threshold, self.auto_learn_threshold)?;
        let fuzzy_cutoff = u8::try_from(self.fuzzy_cutoff)
            .ok()
            .filter(|cutoff| *cutoff <= 100)
            .ok_or(ConfigError::FuzzyCutoffOutOfRange {
                value: self.fuzzy_cutoff,
            })?;

        Ok(ResolverConfig {
            thresholds,
            fuzzy_cutoff,
            index_policy: self.index_policy,
        })
    }

    /// Validated change-scorer sampling.
    pub fn sampling(&self) -> Result<SamplingConfig, ConfigError> {
        SamplingConfig::new(self.sample_size, self.sample_seed)
    }

    /// Batch request for the configured columns.
    pub fn batch_request(&self) -> BatchRequest {
        BatchRequest {
            target_column: self.target_column.clone(),
            department_column: self.department_column.clone(),
            review_top_k: self.review_top_k,
        }
    }

    /// Sentence embedder settings for the selected encoder.
    ///
    /// A model run without a directory yields an empty path that fails
    /// [`SentenceConfig::validate`].
    pub fn sentence_config(&self) -> SentenceConfig {
        match (self.embedder, &self.model_path) {
            (EmbedderKind::Stub, _) => SentenceConfig::stub(),
            (EmbedderKind::Model, Some(path)) => SentenceConfig::new(path),
            (EmbedderKind::Model, None) => SentenceConfig::default(),
        }
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidNumber {
                name: var_name,
                value: value.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_path_from_env(var_name).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
