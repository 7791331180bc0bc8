//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric environment value could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A threshold lies outside `[0, 1]` (or is NaN).
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    /// The auto-learn bar sits below the acceptance bar.
    #[error(
        "auto-learn threshold ({auto_learn}) must be >= similarity threshold ({similarity})"
    )]
    ThresholdOrder { similarity: f32, auto_learn: f32 },

    /// Fuzzy cutoff above 100.
    #[error("fuzzy cutoff must be within 0..=100, got {value}")]
    FuzzyCutoffOutOfRange { value: u32 },

    /// Index policy string not recognised.
    #[error("unknown index policy '{value}': expected 'snapshot' or 'incremental'")]
    UnknownIndexPolicy { value: String },

    /// Embedder kind string not recognised.
    #[error("unknown embedder '{value}': expected 'model' or 'stub'")]
    UnknownEmbedder { value: String },

    /// The model embedder was selected without a model directory.
    #[error("{name} is required unless {opt_in}=stub")]
    MissingModelPath {
        name: &'static str,
        opt_in: &'static str,
    },

    /// A count that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// A column name was set to an empty string.
    #[error("{name} must not be empty")]
    EmptyValue { name: &'static str },
}
