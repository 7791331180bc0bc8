//! Sentence embedder (BERT-family encoder + tokenizer).
//!
//! Use [`SentenceConfig::stub`] for tests and explicit model-less runs. The stub hashes
//! character trigrams and whole words into a fixed-size vector, so lexically close titles
//! land close together while staying fully deterministic. It reports itself as
//! non-semantic, which disables auto-learning.

/// Sentence embedder configuration.
pub mod config;


pub use config::{
    EmbedderKind, SENTENCE_BATCH_SIZE, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig,
};

use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use super::Embedder;
use super::bert::BertSentenceEncoder;
use super::device::select_device;
use super::error::EmbeddingError;
use super::utils::{MODEL_CONFIG_FILE, MODEL_WEIGHTS_FILE, load_sentence_tokenizer};
use crate::index::normalize;

const WORD_FEATURE_WEIGHT: f32 = 2.0;
const TRIGRAM_FEATURE_WEIGHT: f32 = 1.0;

enum EmbedderBackend {
    Model {
        encoder: BertSentenceEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Embedding generator for title matching (supports stub mode).
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: SentenceConfig,
    embedding_dim: usize,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: SentenceConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!(
                embedding_dim = config.embedding_dim,
                "Sentence embedder running in STUB mode (hashed n-grams, not semantic)"
            );
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                embedding_dim: config.embedding_dim,
                config,
            });
        }

        for required in [MODEL_CONFIG_FILE, MODEL_WEIGHTS_FILE] {
            let path = config.model_path.join(required);
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        let device = select_device();
        debug!(?device, "Selected compute device for sentence embedder");

        let tokenizer = load_sentence_tokenizer(&config.model_path, config.max_seq_len)?;
        let encoder = BertSentenceEncoder::load(&config.model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            }
        })?;
        let embedding_dim = encoder.hidden_size();

        info!(
            model_path = %config.model_path.display(),
            embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
            },
            config,
            embedding_dim,
        })
    }

    /// Creates a stub embedder with the default dimension.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(SentenceConfig::stub())
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &SentenceConfig {
        &self.config
    }

    fn embed_with_model(
        &self,
        texts: &[&str],
        encoder: &BertSentenceEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.config.batch_size) {
            let encodings = tokenizer.encode_batch(chunk.to_vec(), true).map_err(|e| {
                EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                }
            })?;

            debug!(
                batch = chunk.len(),
                seq_len = encodings.first().map(|e| e.len()).unwrap_or(0),
                "Encoding batch (transformer forward pass)"
            );

            let input_ids = stack_rows(&encodings, Encoding::get_ids, device)?;
            let type_ids = stack_rows(&encodings, Encoding::get_type_ids, device)?;
            let attention_mask = stack_rows(&encodings, Encoding::get_attention_mask, device)?;

            let pooled = encoder
                .encode(&input_ids, &type_ids, &attention_mask)
                .map_err(|e| EmbeddingError::InferenceFailed {
                    reason: format!("Transformer forward pass failed: {}", e),
                })?;

            for mut row in pooled.to_vec2::<f32>()? {
                normalize(&mut row);
                results.push(row);
            }
        }

        Ok(results)
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.embedding_dim];
        let lowered = text.to_lowercase();

        let padded: Vec<char> = format!(" {} ", lowered.trim()).chars().collect();
        for window in padded.windows(3) {
            let gram: String = window.iter().collect();
            add_hashed_feature(&mut embedding, gram.as_bytes(), TRIGRAM_FEATURE_WEIGHT);
        }
        for word in lowered.split_whitespace() {
            add_hashed_feature(&mut embedding, word.as_bytes(), WORD_FEATURE_WEIGHT);
        }

        normalize(&mut embedding);
        embedding
    }
}

impl Embedder for SentenceEmbedder {
    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut batch = self.embed_batch(&[text])?;
        batch.pop().ok_or_else(|| EmbeddingError::InferenceFailed {
            reason: "encoder returned no vector".to_string(),
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => self.embed_with_model(texts, encoder, tokenizer, device),
            EmbedderBackend::Stub => Ok(texts.iter().map(|text| self.embed_stub(text)).collect()),
        }
    }

    fn is_semantic(&self) -> bool {
        !self.is_stub()
    }
}

fn stack_rows(
    encodings: &[Encoding],
    field: fn(&Encoding) -> &[u32],
    device: &Device,
) -> Result<Tensor, EmbeddingError> {
    let rows = encodings
        .iter()
        .map(|encoding| Tensor::new(field(encoding), device))
        .collect::<candle_core::Result<Vec<_>>>()?;
    Ok(Tensor::stack(&rows, 0)?)
}

fn add_hashed_feature(embedding: &mut [f32], feature: &[u8], weight: f32) {
    let hash = blake3::hash(feature);
    let bytes = hash.as_bytes();

    let mut bucket = [0u8; 8];
    bucket.copy_from_slice(&bytes[..8]);
    let index = (u64::from_le_bytes(bucket) % embedding.len() as u64) as usize;
    let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

    embedding[index] += sign * weight;
}
