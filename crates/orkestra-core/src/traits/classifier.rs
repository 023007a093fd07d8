// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier capability used by the tier router.

use crate::error::OrkestraError;

/// Predicts a concrete model name from an embedding.
///
/// Labels are already tier-resolved model names; callers never map tiers
/// back to models.
pub trait Classifier: Send + Sync {
    /// Returns the predicted label. Must be deterministic for a given input.
    fn predict(&self, embedding: &[f32]) -> Result<String, OrkestraError>;

    /// Version string of the trained artifact backing this classifier.
    fn version(&self) -> &str;
}
