// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ONNX embedding of prompts with the Longformer encoder.
//!
//! Produces a mean-pooled hidden-state vector per prompt on CPU. The
//! tokenizer truncates to `max_length` tokens and pooling averages only the
//! positions whose attention mask is set, so the vectors match what the
//! router artifacts were trained on.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use orkestra_config::EmbeddingConfig;
use orkestra_core::{Embedder, OrkestraError};

/// Embedding width of `longformer-base-4096`.
pub const EMBEDDING_DIM: usize = 768;

/// Maximum input length of `longformer-base-4096`, in tokens.
pub const MAX_LENGTH: usize = 4096;

/// ONNX-based embedder for the Longformer encoder.
///
/// Loads `model.onnx` and `tokenizer.json` from one directory.
pub struct OnnxEmbedder {
    /// ONNX Runtime session; `run` needs exclusive access.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimension: usize,
}

impl OnnxEmbedder {
    /// Loads the model and tokenizer from `model_dir`.
    ///
    /// Truncation to `config.max_length` is configured on the tokenizer;
    /// padding is disabled since prompts are embedded one at a time.
    pub fn load(model_dir: &Path, config: &EmbeddingConfig) -> Result<Self, OrkestraError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            unavailable(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;
        configure_tokenizer(&mut tokenizer, config.max_length)?;

        let session = Session::builder()
            .map_err(|e| unavailable(format!("failed to create ONNX session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| unavailable(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| unavailable(format!("failed to set thread count: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                unavailable(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        info!(
            model_dir = %model_dir.display(),
            max_length = config.max_length,
            "embedding model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimension: config.dimension,
        })
    }

    /// Embeds one text, returning a `dimension`-wide vector.
    ///
    /// Empty text still carries the tokenizer's special tokens and yields a
    /// valid vector.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, OrkestraError> {
        let Encoded {
            input_ids,
            attention_mask,
            truncated,
        } = encode(&self.tokenizer, text)?;
        let seq_len = input_ids.len();
        debug!(tokens = seq_len, truncated, "prompt tokenized");

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| OrkestraError::Embedding(format!("failed to shape input_ids: {e}")))?;
        let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(|e| {
                OrkestraError::Embedding(format!("failed to shape attention_mask: {e}"))
            })?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array).map_err(|e| {
            OrkestraError::Embedding(format!("failed to create input_ids tensor: {e}"))
        })?;
        let attention_mask_tensor =
            TensorRef::from_array_view(&attention_mask_array).map_err(|e| {
                OrkestraError::Embedding(format!("failed to create attention_mask tensor: {e}"))
            })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| OrkestraError::Embedding(format!("ONNX session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])
            .map_err(|e| OrkestraError::Embedding(format!("ONNX inference failed: {e}")))?;

        // last_hidden_state: [1, seq_len, hidden]
        let (shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            OrkestraError::Embedding(format!("failed to extract output tensor: {e}"))
        })?;

        let hidden_size = shape.last().copied().unwrap_or_default() as usize;
        if hidden_size != self.dimension {
            return Err(OrkestraError::Embedding(format!(
                "model produced {hidden_size}-dim states, expected {}",
                self.dimension
            )));
        }
        // Some exports pad the sequence to the attention window internally.
        let out_len = data.len() / hidden_size.max(1);
        if out_len < seq_len {
            return Err(OrkestraError::Embedding(format!(
                "model returned {out_len} positions for {seq_len} tokens"
            )));
        }

        Ok(mean_pool_with_attention(
            data,
            &attention_mask,
            seq_len,
            hidden_size,
        ))
    }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, OrkestraError> {
        self.embed_text(text)
    }
}

/// Token ids and attention mask for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Encoded {
    pub(crate) input_ids: Vec<i64>,
    pub(crate) attention_mask: Vec<i64>,
    /// Whether tokens past `max_length` were dropped.
    pub(crate) truncated: bool,
}

/// Truncates to the first `max_length` tokens and disables padding.
pub(crate) fn configure_tokenizer(
    tokenizer: &mut Tokenizer,
    max_length: usize,
) -> Result<(), OrkestraError> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..TruncationParams::default()
        }))
        .map_err(|e| unavailable(format!("failed to configure truncation: {e}")))?;
    tokenizer.with_padding(None);
    Ok(())
}

pub(crate) fn encode(tokenizer: &Tokenizer, text: &str) -> Result<Encoded, OrkestraError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| OrkestraError::Embedding(format!("tokenization failed: {e}")))?;
    Ok(Encoded {
        input_ids: encoding.get_ids().iter().map(|&id| id as i64).collect(),
        attention_mask: encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect(),
        truncated: !encoding.get_overflowing().is_empty(),
    })
}

fn unavailable(message: String) -> OrkestraError {
    OrkestraError::ModelUnavailable {
        message,
        source: None,
    }
}

/// Mean of the token rows whose attention mask is set.
///
/// Rows past `attention_mask.len()` and masked rows are ignored, as are
/// positions missing from a short `embeddings` buffer. A mask with no set
/// positions yields the zero vector.
pub fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;
    let rows = match hidden_size {
        0 => seq_len,
        _ => seq_len.min(embeddings.len() / hidden_size),
    };

    for (i, &mask) in attention_mask.iter().enumerate().take(rows) {
        if mask > 0 {
            let row = &embeddings[i * hidden_size..(i + 1) * hidden_size];
            for (acc, v) in sum.iter_mut().zip(row) {
                *acc += v;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    sum
}
