// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt embedding and nearest-neighbor tier routing for Orkestra.
//!
//! This crate provides:
//! - [`OnnxEmbedder`]: Longformer prompt embeddings with masked mean pooling
//! - [`LazyEmbedder`]: one-time, concurrency-safe embedder construction
//! - [`ArtifactStore`]: cache / verified download / local fallback resolution
//! - [`KnnClassifier`]: nearest-neighbor prediction over a router artifact
//! - [`TierRouter`]: prompt to concrete model name for one provider

pub mod cache;
pub mod embedder;
pub mod fetch;
pub mod knn;
pub mod lazy;
pub mod model_manager;
pub mod router;

pub use cache::{ArtifactEntry, ArtifactManifest, ArtifactStore};
pub use embedder::{EMBEDDING_DIM, MAX_LENGTH, OnnxEmbedder, mean_pool_with_attention};
pub use fetch::{FetchPolicy, Fetcher, sha256_hex};
pub use knn::{KnnArtifact, KnnClassifier, KnnSample, Metric};
pub use lazy::{EmbedderLoader, LazyEmbedder, OnnxLoader};
pub use model_manager::ModelManager;
pub use router::TierRouter;
