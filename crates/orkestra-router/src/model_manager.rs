// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model download manager for first-run embedding model setup.
//!
//! Downloads the ONNX export and tokenizer on first use and keeps them in
//! the model directory for later runs.

use std::path::PathBuf;

use orkestra_config::EmbeddingConfig;
use orkestra_core::OrkestraError;
use tokio::sync::OnceCell;
use tracing::info;

use crate::fetch::Fetcher;

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Manages embedding model download and path resolution.
pub struct ModelManager {
    model_dir: PathBuf,
    model_url: String,
    tokenizer_url: String,
    fetcher: Fetcher,
    /// Ensures the model is downloaded only once even with concurrent callers.
    ready: OnceCell<PathBuf>,
}

impl ModelManager {
    pub fn new(config: &EmbeddingConfig, fetcher: Fetcher) -> Self {
        Self {
            model_dir: config.resolved_model_dir(),
            model_url: config.model_url.clone(),
            tokenizer_url: config.tokenizer_url.clone(),
            fetcher,
            ready: OnceCell::new(),
        }
    }

    /// Returns the directory where model files are stored.
    pub fn model_dir(&self) -> &PathBuf {
        &self.model_dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(TOKENIZER_FILE)
    }

    /// Returns true if both model and tokenizer files exist.
    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Ensures both files are present, downloading whichever is missing.
    ///
    /// Runs at most once per manager; concurrent callers wait for the first.
    /// A failed download leaves the cell empty so a later call can try again.
    pub async fn ensure_model(&self) -> Result<PathBuf, OrkestraError> {
        self.ready
            .get_or_try_init(|| self.download_missing())
            .await
            .cloned()
    }

    async fn download_missing(&self) -> Result<PathBuf, OrkestraError> {
        if self.is_model_available() {
            return Ok(self.model_dir.clone());
        }

        info!(model_dir = %self.model_dir.display(), "embedding model not found, downloading");

        let files = [
            (MODEL_FILE, self.model_url.as_str()),
            (TOKENIZER_FILE, self.tokenizer_url.as_str()),
        ];
        for (filename, url) in files {
            let dest = self.model_dir.join(filename);
            if dest.exists() {
                continue;
            }
            if url.is_empty() {
                return Err(OrkestraError::ModelUnavailable {
                    message: format!(
                        "{} is missing and no download URL is configured",
                        dest.display()
                    ),
                    source: None,
                });
            }

            info!(file = filename, "downloading");
            let size = self
                .fetcher
                .download(url, None, &dest)
                .await
                .map_err(|e| OrkestraError::ModelUnavailable {
                    message: format!("failed to download {filename}"),
                    source: Some(Box::new(e)),
                })?;
            info!(file = filename, bytes = size, "downloaded");
        }

        info!(model_dir = %self.model_dir.display(), "embedding model ready");
        Ok(self.model_dir.clone())
    }
}
