// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding trait for turning prompt text into classifier input.

use async_trait::async_trait;

use crate::error::OrkestraError;

/// Maps text to a fixed-length dense vector.
///
/// Implementations must be deterministic and must truncate long input to
/// the same maximum token length the routing classifiers were trained
/// with, pooling with the attention mask so padding never contributes.
/// Swapping in a different implementation without honoring that contract
/// silently degrades routing quality.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every vector returned by [`Embedder::embed`].
    fn dimension(&self) -> usize;

    /// Embeds a single text. Empty text yields a valid vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OrkestraError>;
}
