// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic keyword embedder standing in for the ONNX model.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use orkestra_core::{Embedder, OrkestraError};

/// Maps prompts to fixed vectors by keyword.
///
/// The first rule whose keyword occurs in the (lowercased) prompt wins;
/// otherwise the default vector is returned.
#[derive(Clone)]
pub struct StubEmbedder {
    dimension: usize,
    rules: Vec<(String, Vec<f32>)>,
    default: Vec<f32>,
    calls: Arc<AtomicUsize>,
}

impl StubEmbedder {
    /// An embedder that returns `default` for every prompt.
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            dimension: default.len(),
            rules: Vec::new(),
            default,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Adds a keyword rule. `vector` must match the default's length.
    pub fn rule(mut self, keyword: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimension, "rule vector has wrong length");
        self.rules.push((keyword.to_lowercase(), vector));
        self
    }

    /// Three-axis embedder matching [`crate::fixtures::tiered_artifact`]:
    /// "prove" and "theorem" point at the premium axis, "summarize" and
    /// "explain" at the balanced axis, everything else at the budget axis.
    pub fn tiered() -> Self {
        Self::new(vec![1.0, 0.0, 0.0])
            .rule("prove", vec![0.0, 0.0, 1.0])
            .rule("theorem", vec![0.0, 0.0, 1.0])
            .rule("summarize", vec![0.0, 1.0, 0.0])
            .rule("explain", vec![0.0, 1.0, 0.0])
    }

    /// Number of `embed` calls so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, OrkestraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        let vector = self
            .rules
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()))
            .map(|(_, v)| v)
            .unwrap_or(&self.default);
        Ok(vector.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let embedder = StubEmbedder::tiered();
        assert_eq!(embedder.embed("Prove this").await.unwrap(), vec![0.0, 0.0, 1.0]);
        assert_eq!(
            embedder.embed("explain and prove").await.unwrap(),
            vec![0.0, 0.0, 1.0]
        );
        assert_eq!(embedder.embed("hi").await.unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(embedder.embed("").await.unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(embedder.calls(), 4);
        assert_eq!(embedder.dimension(), 3);
    }
}
