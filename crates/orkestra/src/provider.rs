// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-provider facade: pick a model, call the backend, cost the result.

use std::sync::Arc;

use orkestra_core::{GenerationBackend, GenerationRequest, OrkestraError, ProviderKind, TextStream};
use tracing::debug;

use crate::context::Orkestra;
use crate::response::Response;

/// How a [`Provider`] chooses its model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// Route every prompt through the provider's tier router.
    Smart,
    /// Always use one model; `None` means the catalog's fallback model.
    Fixed(Option<String>),
}

/// Per-call options. Unset fields fall back to `[routing]` config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Model override, honored only in fixed mode.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatOptions {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One provider's backend with smart or fixed model selection.
pub struct Provider {
    context: Arc<Orkestra>,
    backend: Arc<dyn GenerationBackend>,
    selection: ModelSelection,
}

impl Provider {
    /// In fixed mode the default model must be non-empty and in the catalog.
    pub fn new(
        context: Arc<Orkestra>,
        backend: Arc<dyn GenerationBackend>,
        selection: ModelSelection,
    ) -> Result<Self, OrkestraError> {
        let kind = backend.provider();
        let models = context.catalog().provider(kind)?;
        let selection = match selection {
            ModelSelection::Smart => ModelSelection::Smart,
            ModelSelection::Fixed(None) => {
                ModelSelection::Fixed(Some(models.fallback_model().to_string()))
            }
            ModelSelection::Fixed(Some(model)) => {
                require_non_empty(&model, "default model")?;
                models.model(&model)?;
                ModelSelection::Fixed(Some(model))
            }
        };
        Ok(Self {
            context,
            backend,
            selection,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.backend.provider()
    }

    pub fn selection(&self) -> &ModelSelection {
        &self.selection
    }

    /// The model a call with `options` would use for `prompt`.
    ///
    /// Smart mode routes the prompt and ignores any override.
    pub async fn resolve_model(
        &self,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<String, OrkestraError> {
        match &self.selection {
            ModelSelection::Smart => {
                if let Some(ignored) = &options.model {
                    debug!(model = %ignored, "model override ignored under smart routing");
                }
                self.context.route(self.kind(), prompt).await
            }
            ModelSelection::Fixed(default) => {
                let model = match &options.model {
                    Some(model) => {
                        require_non_empty(model, "model override")?;
                        model.clone()
                    }
                    None => default.clone().unwrap_or_default(),
                };
                self.context.catalog().model(self.kind(), &model)?;
                Ok(model)
            }
        }
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

    /// Generates a complete response, costed against the provider's base model.
    pub async fn chat(
        &self,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<Response, OrkestraError> {
        let model = self.resolve_model(prompt, options).await?;
        let request = self.request(model, prompt, options);
        let generation = self.backend.call(&request).await?;
        let breakdown = self
            .context
            .cost_breakdown(self.kind(), &request.model, generation.usage)?;
        debug!(
            provider = %self.kind(),
            model = %request.model,
            cost = breakdown.cost,
            "chat completed"
        );
        Ok(Response::new(generation.text, breakdown))
    }

    /// Streams text fragments from the resolved model.
    pub async fn stream_text(
        &self,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<TextStream, OrkestraError> {
        let model = self.resolve_model(prompt, options).await?;
        let request = self.request(model, prompt, options);
        self.backend.stream(&request).await
    }
}

fn require_non_empty(model: &str, what: &str) -> Result<(), OrkestraError> {
    if model.trim().is_empty() {
        return Err(OrkestraError::Config(format!("{what} must not be empty")));
    }
    Ok(())
}
