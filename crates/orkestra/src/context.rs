// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide routing context.
//!
//! One [`Orkestra`] is built at startup and shared by reference. It owns the
//! catalog, the lazily loaded embedder, the artifact store, and one tier
//! router per provider, each loaded on first use and kept for the life of
//! the process.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use orkestra_config::OrkestraConfig;
use orkestra_core::{
    Classifier, Embedder, GenerationBackend, OrkestraError, ProviderKind, RoutingDecision,
    SelectionResult, TokenUsage,
};
use orkestra_registry::{ArtifactInfo, Catalog, CostBreakdown, Manifest};
use orkestra_router::{
    ArtifactStore, FetchPolicy, Fetcher, KnnClassifier, LazyEmbedder, ModelManager, TierRouter,
};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::multi::MultiProvider;
use crate::provider::{ModelSelection, Provider};

/// Shared state for routing, selection and costing.
pub struct Orkestra {
    config: OrkestraConfig,
    catalog: Catalog,
    embedder: Arc<dyn Embedder>,
    model_manager: Option<Arc<ModelManager>>,
    store: ArtifactStore,
    routers: BTreeMap<ProviderKind, OnceCell<Arc<TierRouter>>>,
}

impl Orkestra {
    /// Builds the production context: built-in catalog, ONNX embedder and
    /// the artifact sources named in `config`.
    ///
    /// Nothing is downloaded or loaded here.
    pub fn from_config(config: OrkestraConfig) -> Result<Self, OrkestraError> {
        let fetcher = Fetcher::new(FetchPolicy::from_config(&config.artifacts))?;
        let manager = Arc::new(ModelManager::new(&config.embedding, fetcher));
        let embedder = Arc::new(LazyEmbedder::onnx(Arc::clone(&manager), &config.embedding));
        let store = ArtifactStore::from_config(&config.artifacts)?;
        let mut context = Self::from_parts(config, Catalog::builtin(), embedder, store);
        context.model_manager = Some(manager);
        Ok(context)
    }

    /// Builds a context from explicit parts, e.g. a stub embedder in tests.
    pub fn from_parts(
        config: OrkestraConfig,
        catalog: Catalog,
        embedder: Arc<dyn Embedder>,
        store: ArtifactStore,
    ) -> Self {
        let routers = catalog
            .providers()
            .iter()
            .map(|p| (p.provider(), OnceCell::new()))
            .collect();
        Self {
            config,
            catalog,
            embedder,
            model_manager: None,
            store,
            routers,
        }
    }

    pub fn config(&self) -> &OrkestraConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The tier router for `provider`, loading its artifact on first use.
    ///
    /// Concurrent first callers share one load. A failed load is returned
    /// and the next call tries again.
    pub async fn router(&self, provider: ProviderKind) -> Result<Arc<TierRouter>, OrkestraError> {
        let cell = self
            .routers
            .get(&provider)
            .ok_or_else(|| OrkestraError::UnsupportedProvider(provider.to_string()))?;
        cell.get_or_try_init(|| self.load_router(provider))
            .await
            .cloned()
    }

    #[instrument(skip(self), fields(provider = %provider))]
    async fn load_router(&self, provider: ProviderKind) -> Result<Arc<TierRouter>, OrkestraError> {
        let knn = TierRouter::load_classifier(provider, &self.store).await?;
        self.check_labels(provider, &knn)?;
        info!(version = %knn.version(), "tier router ready");
        Ok(Arc::new(TierRouter::new(
            provider,
            Arc::new(knn),
            Arc::clone(&self.embedder),
        )))
    }

    /// Fails unless every artifact label is a model in the provider's catalog.
    fn check_labels(
        &self,
        provider: ProviderKind,
        knn: &KnnClassifier,
    ) -> Result<(), OrkestraError> {
        let models = self.catalog.provider(provider)?;
        let unknown: Vec<&str> = knn
            .labels()
            .into_iter()
            .filter(|label| !models.contains(label))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        Err(OrkestraError::InvalidArtifact {
            path: self.store.cached_path(provider)?.display().to_string(),
            reason: format!(
                "labels not in the `{provider}` catalog: {}",
                unknown.join(", ")
            ),
        })
    }

    /// Model name the provider's router picks for `prompt`.
    pub async fn route(
        &self,
        provider: ProviderKind,
        prompt: &str,
    ) -> Result<String, OrkestraError> {
        self.router(provider).await?.route(prompt).await
    }

    /// Routes `prompt` for every provider in `providers`, concurrently.
    ///
    /// Decisions come back in the order of `providers`.
    pub async fn route_all(
        &self,
        providers: &[ProviderKind],
        prompt: &str,
    ) -> Result<Vec<RoutingDecision>, OrkestraError> {
        let results = futures::future::join_all(providers.iter().map(|&provider| async move {
            let model = self.route(provider, prompt).await?;
            Ok::<_, OrkestraError>(RoutingDecision::new(provider, model))
        }))
        .await;
        results.into_iter().collect()
    }

    /// Picks one decision under the named strategy.
    pub fn select(
        &self,
        strategy: &str,
        decisions: &[RoutingDecision],
    ) -> Result<SelectionResult, OrkestraError> {
        orkestra_registry::select(strategy, &self.catalog, decisions)
    }

    /// Dollar cost of a call.
    pub fn cost(
        &self,
        provider: &str,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<f64, OrkestraError> {
        self.catalog.cost(provider, model, input_tokens, output_tokens)
    }

    /// Cost with savings against the provider's base model.
    pub fn cost_breakdown(
        &self,
        provider: ProviderKind,
        model: &str,
        usage: TokenUsage,
    ) -> Result<CostBreakdown, OrkestraError> {
        CostBreakdown::compute(&self.catalog, provider, model, usage)
    }

    /// Catalog description plus each provider's artifact file and version.
    pub fn manifest(&self) -> Manifest {
        let mut manifest = Manifest::from_catalog(&self.catalog);
        for provider in ProviderKind::ALL {
            if let Ok(entry) = self.store.manifest().entry(provider) {
                manifest = manifest.with_artifact(
                    provider,
                    ArtifactInfo {
                        filename: entry.filename.clone(),
                        version: entry.version.clone(),
                    },
                );
            }
        }
        manifest
    }

    /// Downloads the embedding model and resolves every provider's artifact
    /// ahead of time. Returns the resolved artifact paths.
    pub async fn prefetch(&self) -> Result<Vec<(ProviderKind, PathBuf)>, OrkestraError> {
        if let Some(manager) = &self.model_manager {
            let dir = manager.ensure_model().await?;
            info!(model_dir = %dir.display(), "embedding model present");
        }
        let mut resolved = Vec::new();
        for provider in self.store.manifest().providers() {
            let path = self.store.resolve(provider).await?;
            debug!(provider = %provider, path = %path.display(), "artifact present");
            resolved.push((provider, path));
        }
        Ok(resolved)
    }

    /// A single-provider facade over `backend`.
    pub fn provider(
        self: &Arc<Self>,
        backend: Arc<dyn GenerationBackend>,
        selection: ModelSelection,
    ) -> Result<Provider, OrkestraError> {
        Provider::new(Arc::clone(self), backend, selection)
    }

    /// A single-provider facade using `routing.smart_routing` from config.
    pub fn default_provider(
        self: &Arc<Self>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Provider, OrkestraError> {
        let selection = if self.config.routing.smart_routing {
            ModelSelection::Smart
        } else {
            ModelSelection::Fixed(None)
        };
        self.provider(backend, selection)
    }

    /// A multi-provider facade over `backends`.
    pub fn multi(
        self: &Arc<Self>,
        backends: Vec<Arc<dyn GenerationBackend>>,
    ) -> Result<MultiProvider, OrkestraError> {
        MultiProvider::new(Arc::clone(self), backends)
    }
}
