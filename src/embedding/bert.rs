use candle_core::{DType, Device, Result, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use std::path::Path;
use std::sync::Arc;

use super::utils::{MODEL_CONFIG_FILE, MODEL_WEIGHTS_FILE};

/// BERT-family sentence encoder with attention-masked mean pooling
/// (sentence-transformers layout: `config.json` + `model.safetensors`).
#[derive(Clone)]
pub struct BertSentenceEncoder {
    model: Arc<BertModel>,
    hidden_size: usize,
}

impl BertSentenceEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        let config_content = std::fs::read_to_string(model_dir.join(MODEL_CONFIG_FILE))?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| candle_core::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let weights_path = model_dir.join(MODEL_WEIGHTS_FILE);
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, device)? };

        // Exported checkpoints sometimes keep the `bert.` prefix of the pre-training head.
        let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)?
        } else {
            BertModel::load(vb, &config)?
        };

        Ok(Self {
            model: Arc::new(model),
            hidden_size: config.hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Encodes a padded batch into `[batch, hidden]` mean-pooled sentence vectors.
    ///
    /// All three inputs are `[batch, seq_len]` `u32` tensors.
    pub fn encode(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .model
            .forward(input_ids, token_type_ids, Some(attention_mask))?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        // Every row carries at least the special tokens, so counts are never zero.
        let counts = mask.sum(1)?;
        summed.broadcast_div(&counts)
    }
}
