// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Orkestra routing and selection.

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// The stage of a routing request that produced an error.
///
/// Reported alongside every failure so routing problems can be told apart
/// from generation backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Bad provider, model, catalog or config input.
    Configuration,
    /// Embedding model load or inference.
    Embedding,
    /// Nearest-neighbor prediction.
    Classification,
    /// Cache, remote fetch or local fallback of a router artifact.
    ArtifactResolution,
    /// Strategy-based choice among providers.
    Selection,
    /// Text generation call to a provider.
    Backend,
}

/// The primary error type used across all Orkestra crates.
#[derive(Debug, Error)]
pub enum OrkestraError {
    /// Provider name is not one of the supported providers.
    #[error("unknown provider `{0}`; supported: anthropic, google, openai")]
    UnknownProvider(String),

    /// Model name is not in the provider's catalog.
    #[error("unknown model `{model}` for provider `{provider}`")]
    UnknownModel { provider: String, model: String },

    /// Strategy name is not one of the named strategies.
    #[error("unknown strategy `{0}`; available: balanced, cheapest, smartest")]
    UnknownStrategy(String),

    /// No router artifact is mapped for this provider.
    #[error("no router model available for `{0}`")]
    UnsupportedProvider(String),

    /// Catalog failed validation at construction time.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Embedding weights or tokenizer could not be obtained or loaded.
    #[error("embedding model unavailable: {message}")]
    ModelUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding inference failed for a loaded model.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Every artifact source was exhausted.
    #[error("router artifact for `{provider}` not found: {}", attempts.join("; "))]
    ArtifactNotFound {
        provider: String,
        attempts: Vec<String>,
    },

    /// A fetched file did not match its pinned SHA-256 digest.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Network fetch failed (connection, status, body).
    #[error("fetch failed: {message}")]
    ArtifactFetch {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Artifact was found but could not be parsed or failed validation.
    #[error("invalid router artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },

    /// The classifier could not produce a label for an embedding.
    #[error("classification failed for `{provider}`: {message}")]
    Classification { provider: String, message: String },

    /// Strategy was asked to choose among zero candidates.
    #[error("no routing candidates to select from")]
    NoCandidates,

    /// Generation backend call failed.
    #[error("backend error from `{provider}`: {message}")]
    Backend {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid runtime configuration or arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl OrkestraError {
    /// Returns the stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            OrkestraError::UnknownProvider(_)
            | OrkestraError::UnknownModel { .. }
            | OrkestraError::InvalidCatalog(_)
            | OrkestraError::Config(_) => Stage::Configuration,
            OrkestraError::ModelUnavailable { .. } | OrkestraError::Embedding(_) => {
                Stage::Embedding
            }
            OrkestraError::Classification { .. } => Stage::Classification,
            OrkestraError::UnsupportedProvider(_)
            | OrkestraError::ArtifactNotFound { .. }
            | OrkestraError::ChecksumMismatch { .. }
            | OrkestraError::ArtifactFetch { .. }
            | OrkestraError::InvalidArtifact { .. }
            | OrkestraError::Io { .. } => Stage::ArtifactResolution,
            OrkestraError::UnknownStrategy(_) | OrkestraError::NoCandidates => Stage::Selection,
            OrkestraError::Backend { .. } => Stage::Backend,
        }
    }

    /// Builds an [`OrkestraError::Io`] tagged with the offending path.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        OrkestraError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
