use std::path::{Path, PathBuf};

use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use super::error::EmbeddingError;

/// Files a sentence-encoder directory must contain.
pub const MODEL_CONFIG_FILE: &str = "config.json";
pub const MODEL_WEIGHTS_FILE: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Resolves `tokenizer.json` from a model directory or an explicit file path.
pub fn tokenizer_path(model_path: &Path) -> PathBuf {
    if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new(TOKENIZER_FILE))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join(TOKENIZER_FILE)
    } else {
        model_path
            .parent()
            .map(|p| p.join(TOKENIZER_FILE))
            .unwrap_or_else(|| PathBuf::from(TOKENIZER_FILE))
    }
}

/// Loads a tokenizer configured for batched sentence encoding.
///
/// Inputs are truncated to `max_len` tokens and padded to the longest sequence in a batch,
/// so the attention mask is required when pooling.
pub fn load_sentence_tokenizer(model_path: &Path, max_len: usize) -> Result<Tokenizer, EmbeddingError> {
    let path = tokenizer_path(model_path);
    if !path.exists() {
        return Err(EmbeddingError::ModelNotFound { path });
    }

    let mut tokenizer =
        Tokenizer::from_file(&path).map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("failed to load {}: {}", path.display(), e),
        })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("failed to configure truncation: {}", e),
        })?;
    tokenizer.with_padding(Some(PaddingParams::default()));

    Ok(tokenizer)
}
