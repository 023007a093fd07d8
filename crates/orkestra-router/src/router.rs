// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-provider tier routing: embed the prompt, classify the vector.
//!
//! The classifier's labels are concrete model names, so the router output
//! needs no tier-to-model mapping.

use std::sync::Arc;

use orkestra_core::{Classifier, Embedder, OrkestraError, ProviderKind, RoutingDecision};
use tracing::{debug, instrument};

use crate::cache::ArtifactStore;
use crate::knn::KnnClassifier;

/// Routes prompts for one provider.
///
/// Cheap to query and safe to share across concurrent callers once built.
pub struct TierRouter {
    provider: ProviderKind,
    classifier: Arc<dyn Classifier>,
    embedder: Arc<dyn Embedder>,
}

impl TierRouter {
    pub fn new(
        provider: ProviderKind,
        classifier: Arc<dyn Classifier>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            provider,
            classifier,
            embedder,
        }
    }

    /// Resolves and loads `provider`'s artifact through `store`.
    #[instrument(skip(store, embedder), fields(provider = %provider))]
    pub async fn load(
        provider: ProviderKind,
        store: &ArtifactStore,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, OrkestraError> {
        let knn = Self::load_classifier(provider, store).await?;
        Ok(Self::new(provider, Arc::new(knn), embedder))
    }

    /// Like [`TierRouter::load`] for a provider given by name.
    ///
    /// Names outside the supported set fail with
    /// [`OrkestraError::UnsupportedProvider`].
    pub async fn from_name(
        name: &str,
        store: &ArtifactStore,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, OrkestraError> {
        let provider = ProviderKind::from_name(name)
            .map_err(|_| OrkestraError::UnsupportedProvider(name.to_string()))?;
        Self::load(provider, store, embedder).await
    }

    /// Resolves the artifact file and parses it off the async runtime.
    pub async fn load_classifier(
        provider: ProviderKind,
        store: &ArtifactStore,
    ) -> Result<KnnClassifier, OrkestraError> {
        let path = store.resolve(provider).await?;
        tokio::task::spawn_blocking(move || KnnClassifier::load(&path, provider))
            .await
            .map_err(|e| OrkestraError::InvalidArtifact {
                path: provider.to_string(),
                reason: format!("artifact load task failed: {e}"),
            })?
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Version of the loaded artifact.
    pub fn version(&self) -> &str {
        self.classifier.version()
    }

    /// Returns the model name the classifier picks for `prompt`.
    #[instrument(skip(self, prompt), fields(provider = %self.provider))]
    pub async fn route(&self, prompt: &str) -> Result<String, OrkestraError> {
        let embedding = self.embedder.embed(prompt).await?;
        let model = self.classifier.predict(&embedding)?;
        debug!(model = %model, prompt_chars = prompt.chars().count(), "prompt routed");
        Ok(model)
    }

    pub async fn decide(&self, prompt: &str) -> Result<RoutingDecision, OrkestraError> {
        let model = self.route(prompt).await?;
        Ok(RoutingDecision::new(self.provider, model))
    }
}
