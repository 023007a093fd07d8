// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router artifact fixtures written into temporary directories.

use std::path::{Path, PathBuf};

use orkestra_core::ProviderKind;
use orkestra_router::{KnnArtifact, KnnSample, Metric, sha256_hex};
use tempfile::TempDir;

/// A three-sample artifact over the axes used by
/// [`crate::StubEmbedder::tiered`]: budget, balanced, premium.
pub fn tiered_artifact(provider: ProviderKind, labels: [&str; 3]) -> KnnArtifact {
    let axes = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    KnnArtifact {
        provider,
        version: "0.2.0".into(),
        metric: Metric::Euclidean,
        k: 1,
        dimension: 3,
        samples: labels
            .iter()
            .zip(axes)
            .map(|(label, axis)| KnnSample {
                label: (*label).to_string(),
                embedding: axis.to_vec(),
            })
            .collect(),
    }
}

/// Labels of the built-in catalog, cheapest tier first.
pub fn builtin_labels(provider: ProviderKind) -> [&'static str; 3] {
    match provider {
        ProviderKind::Google => [
            "gemini-2.5-flash-lite",
            "gemini-3-flash-preview",
            "gemini-3-pro-preview",
        ],
        ProviderKind::Anthropic => ["claude-haiku-4", "claude-sonnet-4-5", "claude-opus-4"],
        ProviderKind::OpenAi => ["gpt-4o-mini", "gpt-4o", "o3"],
    }
}

/// A temporary directory holding router artifacts.
pub struct ArtifactFixture {
    dir: TempDir,
}

impl ArtifactFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {e}")),
        }
    }

    /// A fixture holding a tiered artifact for every provider, labelled
    /// with the built-in catalog's models.
    pub fn builtin() -> Self {
        let fixture = Self::new();
        for provider in ProviderKind::ALL {
            fixture.write(&tiered_artifact(provider, builtin_labels(provider)));
        }
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// File name an artifact for `provider` is stored under.
    pub fn filename(provider: ProviderKind) -> String {
        format!("router-{provider}.json")
    }

    /// Writes `artifact` as `router-<provider>.json`; returns its path and
    /// SHA-256.
    pub fn write(&self, artifact: &KnnArtifact) -> (PathBuf, String) {
        let bytes = serde_json::to_vec(artifact)
            .unwrap_or_else(|e| panic!("failed to serialize artifact: {e}"));
        self.write_bytes(&Self::filename(artifact.provider), &bytes)
    }

    /// Writes raw bytes under `filename`; returns its path and SHA-256.
    pub fn write_bytes(&self, filename: &str, bytes: &[u8]) -> (PathBuf, String) {
        let path = self.dir.path().join(filename);
        std::fs::write(&path, bytes)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
        (path, sha256_hex(bytes))
    }
}

impl Default for ArtifactFixture {
    fn default() -> Self {
        Self::new()
    }
}
