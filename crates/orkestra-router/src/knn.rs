// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nearest-neighbor classifier loaded from a JSON router artifact.
//!
//! An artifact is the exported training set of one provider's router: every
//! sample pairs a prompt embedding with the model name that should serve it.
//! Prediction is exhaustive (the sample sets are small), so results depend
//! only on the artifact and the query vector.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use orkestra_core::{Classifier, OrkestraError, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distance used to rank samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    /// `1 - cosine similarity`; zero vectors are at distance 1 from everything.
    Cosine,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::Cosine => write!(f, "cosine"),
        }
    }
}

/// On-disk form of a router artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnArtifact {
    pub provider: ProviderKind,
    pub version: String,
    #[serde(default)]
    pub metric: Metric,
    #[serde(default = "default_k")]
    pub k: usize,
    pub dimension: usize,
    pub samples: Vec<KnnSample>,
}

fn default_k() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnSample {
    pub label: String,
    pub embedding: Vec<f32>,
}

/// A validated, query-ready nearest-neighbor model.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    provider: ProviderKind,
    version: String,
    metric: Metric,
    k: usize,
    /// One row per sample, in artifact order.
    embeddings: Array2<f32>,
    labels: Vec<String>,
}

impl KnnClassifier {
    /// Validates `artifact` for `expected` and builds the classifier.
    ///
    /// `origin` names the artifact in error messages (usually its path).
    pub fn from_artifact(
        artifact: KnnArtifact,
        expected: ProviderKind,
        origin: &str,
    ) -> Result<Self, OrkestraError> {
        let invalid = |reason: String| OrkestraError::InvalidArtifact {
            path: origin.to_string(),
            reason,
        };

        if artifact.provider != expected {
            return Err(invalid(format!(
                "artifact is for `{}`, expected `{expected}`",
                artifact.provider
            )));
        }
        if artifact.samples.is_empty() {
            return Err(invalid("artifact has no samples".into()));
        }
        if artifact.dimension == 0 {
            return Err(invalid("dimension must be positive".into()));
        }
        if artifact.k == 0 || artifact.k > artifact.samples.len() {
            return Err(invalid(format!(
                "k = {} must be between 1 and the sample count {}",
                artifact.k,
                artifact.samples.len()
            )));
        }

        let rows = artifact.samples.len();
        let mut flat = Vec::with_capacity(rows * artifact.dimension);
        let mut labels = Vec::with_capacity(rows);
        for (i, sample) in artifact.samples.into_iter().enumerate() {
            if sample.embedding.len() != artifact.dimension {
                return Err(invalid(format!(
                    "sample {i} has {} values, expected {}",
                    sample.embedding.len(),
                    artifact.dimension
                )));
            }
            if sample.label.is_empty() {
                return Err(invalid(format!("sample {i} has an empty label")));
            }
            if sample.embedding.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("sample {i} has a non-finite value")));
            }
            flat.extend(sample.embedding);
            labels.push(sample.label);
        }
        let embeddings = Array2::from_shape_vec((rows, artifact.dimension), flat)
            .map_err(|e| invalid(format!("failed to shape samples: {e}")))?;

        Ok(Self {
            provider: artifact.provider,
            version: artifact.version,
            metric: artifact.metric,
            k: artifact.k,
            embeddings,
            labels,
        })
    }

    /// Reads and validates the JSON artifact at `path`.
    pub fn load(path: &Path, expected: ProviderKind) -> Result<Self, OrkestraError> {
        let origin = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| OrkestraError::io(path, e))?;
        let artifact: KnnArtifact =
            serde_json::from_slice(&bytes).map_err(|e| OrkestraError::InvalidArtifact {
                path: origin.clone(),
                reason: e.to_string(),
            })?;
        let classifier = Self::from_artifact(artifact, expected, &origin)?;
        debug!(
            provider = %expected,
            version = %classifier.version,
            samples = classifier.labels.len(),
            k = classifier.k,
            metric = %classifier.metric,
            "router artifact loaded"
        );
        Ok(classifier)
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Distinct labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    fn distance(&self, row: ArrayView1<'_, f32>, query: &[f32]) -> f64 {
        match self.metric {
            Metric::Euclidean => row
                .iter()
                .zip(query)
                .map(|(a, b)| {
                    let d = f64::from(*a) - f64::from(*b);
                    d * d
                })
                .sum::<f64>()
                .sqrt(),
            Metric::Cosine => {
                let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
                for (a, b) in row.iter().zip(query) {
                    let (a, b) = (f64::from(*a), f64::from(*b));
                    dot += a * b;
                    na += a * a;
                    nb += b * b;
                }
                if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (na.sqrt() * nb.sqrt())
                }
            }
        }
    }

    fn nearest(&self, distances: &[f64]) -> usize {
        let mut best = 0;
        for (i, d) in distances.iter().enumerate().skip(1) {
            if d.total_cmp(&distances[best]).is_lt() {
                best = i;
            }
        }
        best
    }

    fn vote(&self, distances: &[f64]) -> &str {
        let mut order: Vec<usize> = (0..distances.len()).collect();
        // Stable, so equal distances keep index order.
        order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &i in order.iter().take(self.k) {
            *counts.entry(self.labels[i].as_str()).or_default() += 1;
        }
        // BTreeMap iterates labels ascending; keep the first maximum.
        let mut winner = ("", 0);
        for (label, count) in counts {
            if count > winner.1 {
                winner = (label, count);
            }
        }
        winner.0
    }
}

impl Classifier for KnnClassifier {
    fn predict(&self, embedding: &[f32]) -> Result<String, OrkestraError> {
        if embedding.len() != self.dimension() {
            return Err(OrkestraError::Classification {
                provider: self.provider.to_string(),
                message: format!(
                    "embedding has {} values, artifact expects {}",
                    embedding.len(),
                    self.dimension()
                ),
            });
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(OrkestraError::Classification {
                provider: self.provider.to_string(),
                message: "embedding contains non-finite values".into(),
            });
        }

        let distances: Vec<f64> = self
            .embeddings
            .rows()
            .into_iter()
            .map(|row| self.distance(row, embedding))
            .collect();

        let label = if self.k == 1 {
            self.labels[self.nearest(&distances)].as_str()
        } else {
            self.vote(&distances)
        };
        Ok(label.to_string())
    }

    fn version(&self) -> &str {
        &self.version
    }
}
