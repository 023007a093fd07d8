// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-provider facade: route per provider, pick one, call only the winner.

use std::str::FromStr;
use std::sync::Arc;

use orkestra_core::{
    GenerationBackend, GenerationRequest, OrkestraError, ProviderKind, SelectionResult, TextStream,
};
use orkestra_registry::{CostBreakdown, Strategy};
use tracing::{debug, info};

use crate::context::Orkestra;
use crate::provider::ChatOptions;
use crate::response::Response;

/// Several providers' backends, each routed independently per prompt.
pub struct MultiProvider {
    context: Arc<Orkestra>,
    backends: Vec<Arc<dyn GenerationBackend>>,
}

impl MultiProvider {
    /// Requires at least one backend and at most one per provider.
    pub fn new(
        context: Arc<Orkestra>,
        backends: Vec<Arc<dyn GenerationBackend>>,
    ) -> Result<Self, OrkestraError> {
        if backends.is_empty() {
            return Err(OrkestraError::Config(
                "a multi-provider needs at least one provider".into(),
            ));
        }
        let mut seen: Vec<ProviderKind> = Vec::with_capacity(backends.len());
        for backend in &backends {
            let kind = backend.provider();
            if seen.contains(&kind) {
                return Err(OrkestraError::Config(format!(
                    "provider `{kind}` was given more than once"
                )));
            }
            context.catalog().provider(kind)?;
            seen.push(kind);
        }
        Ok(Self { context, backends })
    }

    /// Providers in the order they were given.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.backends.iter().map(|b| b.provider()).collect()
    }

    /// Routes `prompt` for every provider and applies `strategy`.
    ///
    /// `None` uses `routing.default_strategy`. The strategy name is checked
    /// before any routing happens.
    pub async fn choose(
        &self,
        prompt: &str,
        strategy: Option<&str>,
    ) -> Result<SelectionResult, OrkestraError> {
        let name = strategy.unwrap_or(&self.context.config().routing.default_strategy);
        let strategy = Strategy::from_str(name)?;

        let decisions = self.context.route_all(&self.providers(), prompt).await?;
        let selection = strategy.select(self.context.catalog(), &decisions)?;
        info!(
            strategy = %strategy,
            provider = %selection.provider,
            model = %selection.model,
            candidates = decisions.len(),
            "provider selected"
        );
        Ok(selection)
    }

    fn backend(
        &self,
        provider: ProviderKind,
    ) -> Result<&Arc<dyn GenerationBackend>, OrkestraError> {
        self.backends
            .iter()
            .find(|b| b.provider() == provider)
            .ok_or_else(|| OrkestraError::UnknownProvider(provider.to_string()))
    }

    fn request(&self, model: String, prompt: &str, options: &ChatOptions) -> GenerationRequest {
        let routing = &self.context.config().routing;
        GenerationRequest {
            model,
            prompt: prompt.to_string(),
            max_tokens: options.max_tokens.unwrap_or(routing.max_tokens),
            temperature: options.temperature.unwrap_or(routing.temperature),
        }
    }

    /// Calls the selected provider only. The response reports no savings;
    /// its base model is the chosen model.
    pub async fn chat(
        &self,
        prompt: &str,
        strategy: Option<&str>,
        options: &ChatOptions,
    ) -> Result<Response, OrkestraError> {
        let selection = self.choose(prompt, strategy).await?;
        let backend = self.backend(selection.provider)?;
        let request = self.request(selection.model, prompt, options);
        let generation = backend.call(&request).await?;
        let breakdown = CostBreakdown::without_savings(
            self.context.catalog(),
            selection.provider,
            &request.model,
            generation.usage,
        )?;
        debug!(cost = breakdown.cost, "multi-provider chat completed");
        Ok(Response::new(generation.text, breakdown))
    }

    /// Streams from the selected provider only.
    pub async fn stream_text(
        &self,
        prompt: &str,
        strategy: Option<&str>,
        options: &ChatOptions,
    ) -> Result<TextStream, OrkestraError> {
        let selection = self.choose(prompt, strategy).await?;
        let backend = self.backend(selection.provider)?;
        let request = self.request(selection.model, prompt, options);
        backend.stream(&request).await
    }
}
