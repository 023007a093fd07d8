// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazily constructed embedder shared across routers.
//!
//! The ONNX session is expensive to build, so nothing is loaded until the
//! first `embed` call. Concurrent first callers wait on a single load.

use std::sync::Arc;

use async_trait::async_trait;
use orkestra_config::EmbeddingConfig;
use orkestra_core::{Embedder, OrkestraError};
use tokio::sync::OnceCell;
use tracing::info;

use crate::embedder::OnnxEmbedder;
use crate::model_manager::ModelManager;

/// Builds the underlying embedder on first use.
#[async_trait]
pub trait EmbedderLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Embedder>, OrkestraError>;
}

/// Downloads the model if needed, then opens an ONNX session.
pub struct OnnxLoader {
    manager: Arc<ModelManager>,
    config: EmbeddingConfig,
}

impl OnnxLoader {
    pub fn new(manager: Arc<ModelManager>, config: EmbeddingConfig) -> Self {
        Self { manager, config }
    }
}

#[async_trait]
impl EmbedderLoader for OnnxLoader {
    async fn load(&self) -> Result<Arc<dyn Embedder>, OrkestraError> {
        let model_dir = self.manager.ensure_model().await?;
        let config = self.config.clone();
        let embedder =
            tokio::task::spawn_blocking(move || OnnxEmbedder::load(&model_dir, &config))
                .await
                .map_err(|e| OrkestraError::ModelUnavailable {
                    message: "embedding model load task failed".into(),
                    source: Some(Box::new(e)),
                })??;
        Ok(Arc::new(embedder))
    }
}

/// An [`Embedder`] that defers construction to its loader.
///
/// A failed load is returned to every waiting caller and leaves the cell
/// empty; the next call runs the loader again.
pub struct LazyEmbedder {
    loader: Box<dyn EmbedderLoader>,
    dimension: usize,
    cell: OnceCell<Arc<dyn Embedder>>,
}

impl LazyEmbedder {
    pub fn new(loader: Box<dyn EmbedderLoader>, dimension: usize) -> Self {
        Self {
            loader,
            dimension,
            cell: OnceCell::new(),
        }
    }

    /// ONNX-backed lazy embedder for `config`.
    pub fn onnx(manager: Arc<ModelManager>, config: &EmbeddingConfig) -> Self {
        Self::new(
            Box::new(OnnxLoader::new(manager, config.clone())),
            config.dimension,
        )
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the shared embedder, loading it on first use.
    pub async fn get(&self) -> Result<&Arc<dyn Embedder>, OrkestraError> {
        self.cell
            .get_or_try_init(|| async {
                let embedder = self.loader.load().await?;
                if embedder.dimension() != self.dimension {
                    return Err(OrkestraError::ModelUnavailable {
                        message: format!(
                            "loaded embedder is {}-dimensional, expected {}",
                            embedder.dimension(),
                            self.dimension
                        ),
                        source: None,
                    });
                }
                info!(dimension = self.dimension, "embedder initialized");
                Ok(embedder)
            })
            .await
    }
}

#[async_trait]
impl Embedder for LazyEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, OrkestraError> {
        self.get().await?.embed(text).await
    }
}
