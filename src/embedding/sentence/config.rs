use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::embedding::error::EmbeddingError;

/// Default stub embedding dimension.
pub const SENTENCE_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default max sequence length fed to the encoder.
pub const SENTENCE_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

/// Default number of texts per forward pass.
pub const SENTENCE_BATCH_SIZE: usize = 64;

/// Which encoder backs a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Sentence-transformer loaded from the model directory.
    #[default]
    Model,
    /// Hashed n-gram vectors. Lexical only, so the resolver never auto-learns from it.
    Stub,
}

impl EmbedderKind {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedderKind::Model => "model",
            EmbedderKind::Stub => "stub",
        }
    }
}

impl FromStr for EmbedderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(EmbedderKind::Model),
            "stub" => Ok(EmbedderKind::Stub),
            _ => Err(ConfigError::UnknownEmbedder {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
pub struct SentenceConfig {
    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    pub model_path: PathBuf,
    /// Max tokens per text.
    pub max_seq_len: usize,
    /// Stub output dimension. A loaded model reports its own hidden size instead.
    pub embedding_dim: usize,
    /// Texts per forward pass in [`embed_batch`](super::SentenceEmbedder::embed_batch).
    pub batch_size: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            max_seq_len: SENTENCE_MAX_SEQ_LEN,
            embedding_dim: SENTENCE_EMBEDDING_DIM,
            batch_size: SENTENCE_BATCH_SIZE,
            testing_stub: false,
        }
    }
}

impl SentenceConfig {
    /// Env var used to locate the model directory.
    pub const ENV_MODEL_PATH: &'static str = "TITLENORM_MODEL_PATH";

    /// Env var selecting the encoder (`model` or `stub`).
    pub const ENV_EMBEDDER: &'static str = "TITLENORM_EMBEDDER";

    /// Loads config from the environment.
    ///
    /// The stub is only selected by `TITLENORM_EMBEDDER=stub`. An unset model path
    /// otherwise leaves `model_path` empty and [`validate`](Self::validate) fails.
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let kind = match env_value(Self::ENV_EMBEDDER) {
            Some(value) => value
                .parse::<EmbedderKind>()
                .map_err(|e| EmbeddingError::InvalidConfig {
                    reason: e.to_string(),
                })?,
            None => EmbedderKind::default(),
        };

        Ok(match kind {
            EmbedderKind::Stub => Self::stub(),
            EmbedderKind::Model => env_value(Self::ENV_MODEL_PATH)
                .map(Self::new)
                .unwrap_or_default(),
        })
    }

    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Sets the stub output dimension.
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Validates required fields.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }

        if self.batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "batch_size must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "{} is required unless {}=stub",
                    Self::ENV_MODEL_PATH,
                    Self::ENV_EMBEDDER
                ),
            });
        }

        if !self.model_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_path.clone(),
            });
        }

        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
