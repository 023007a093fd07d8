// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider model catalog.
//!
//! Prices verified from the providers' public pricing pages, USD per million tokens:
//!
//! Google:    gemini-2.5-flash-lite 0.10/0.40, gemini-3-flash-preview 0.50/3.00,
//!            gemini-3-pro-preview 2.00/12.00
//! Anthropic: claude-haiku-4 0.80/4.00, claude-sonnet-4-5 3.00/15.00,
//!            claude-opus-4 15.00/75.00
//! OpenAI:    gpt-4o-mini 0.15/0.60, gpt-4o 2.50/10.00, o3 10.00/40.00

use std::collections::HashSet;

use orkestra_core::{OrkestraError, ProviderKind, Tier};
use serde::{Deserialize, Serialize};

/// Pricing and capability metadata for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    /// USD per million input tokens.
    pub input_price_per_million: f64,
    /// USD per million output tokens.
    pub output_price_per_million: f64,
    pub context_window: u64,
    pub tier: Tier,
}

impl ModelEntry {
    pub fn new(
        name: impl Into<String>,
        input_price_per_million: f64,
        output_price_per_million: f64,
        context_window: u64,
        tier: Tier,
    ) -> Self {
        Self {
            name: name.into(),
            input_price_per_million,
            output_price_per_million,
            context_window,
            tier,
        }
    }

    /// `input + output` price per million, the comparison key for strategies.
    pub fn combined_price(&self) -> f64 {
        self.input_price_per_million + self.output_price_per_million
    }
}

/// One provider's ordered model set plus its base and fallback models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCatalog {
    provider: ProviderKind,
    models: Vec<ModelEntry>,
    base_model: String,
    fallback_model: String,
}

impl ProviderCatalog {
    /// Builds an unvalidated provider catalog. [`Catalog::new`] validates it.
    pub fn new(
        provider: ProviderKind,
        models: Vec<ModelEntry>,
        base_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            models,
            base_model: base_model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Models in catalog order.
    pub fn models(&self) -> &[ModelEntry] {
        &self.models
    }

    pub fn get(&self, model: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.name == model)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.get(model).is_some()
    }

    /// Looks up a model, failing with [`OrkestraError::UnknownModel`].
    pub fn model(&self, model: &str) -> Result<&ModelEntry, OrkestraError> {
        self.get(model).ok_or_else(|| OrkestraError::UnknownModel {
            provider: self.provider.to_string(),
            model: model.to_string(),
        })
    }

    /// Highest-tier reference model used for savings comparison.
    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    /// Model used when classification is bypassed.
    pub fn fallback_model(&self) -> &str {
        &self.fallback_model
    }

    /// Models of one tier, in catalog order.
    pub fn models_in_tier(&self, tier: Tier) -> impl Iterator<Item = &ModelEntry> {
        self.models.iter().filter(move |m| m.tier == tier)
    }

    fn validate(&self) -> Result<(), String> {
        let provider = self.provider;
        if self.models.is_empty() {
            return Err(format!("provider `{provider}` has no models"));
        }

        let mut seen = HashSet::new();
        for entry in &self.models {
            if entry.name.trim().is_empty() {
                return Err(format!("provider `{provider}` has a model with an empty name"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(format!(
                    "provider `{provider}` lists model `{}` twice",
                    entry.name
                ));
            }
            for (label, price) in [
                ("input", entry.input_price_per_million),
                ("output", entry.output_price_per_million),
            ] {
                if !price.is_finite() || price <= 0.0 {
                    return Err(format!(
                        "model `{provider}/{}` has non-positive {label} price {price}",
                        entry.name
                    ));
                }
            }
        }

        for tier in Tier::ALL {
            if self.models_in_tier(tier).next().is_none() {
                return Err(format!("provider `{provider}` has no `{tier}` model"));
            }
        }

        let base = self.get(&self.base_model).ok_or_else(|| {
            format!(
                "base model `{}` is not a `{provider}` model",
                self.base_model
            )
        })?;
        let top = self.models.iter().map(|m| m.tier).max();
        if Some(base.tier) != top {
            return Err(format!(
                "base model `{provider}/{}` is not in the highest tier",
                base.name
            ));
        }

        if !self.contains(&self.fallback_model) {
            return Err(format!(
                "fallback model `{}` is not a `{provider}` model",
                self.fallback_model
            ));
        }

        Ok(())
    }
}

/// Immutable registry of provider -> model metadata.
///
/// Constructed once per process (normally via [`Catalog::builtin`]) and
/// shared by reference; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    providers: Vec<ProviderCatalog>,
}

impl Catalog {
    /// Builds a catalog, rejecting invalid pricing, missing tiers, unknown
    /// base/fallback models and duplicate providers.
    pub fn new(providers: Vec<ProviderCatalog>) -> Result<Self, OrkestraError> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.provider) {
                return Err(OrkestraError::InvalidCatalog(format!(
                    "provider `{}` is defined twice",
                    provider.provider
                )));
            }
            provider.validate().map_err(OrkestraError::InvalidCatalog)?;
        }
        Ok(Self { providers })
    }

    /// The reference catalog for Google, Anthropic and OpenAI.
    pub fn builtin() -> Self {
        let google = ProviderCatalog::new(
            ProviderKind::Google,
            vec![
                ModelEntry::new("gemini-2.5-flash-lite", 0.10, 0.40, 1_048_576, Tier::Budget),
                ModelEntry::new("gemini-3-flash-preview", 0.50, 3.00, 1_048_576, Tier::Balanced),
                ModelEntry::new("gemini-3-pro-preview", 2.00, 12.00, 1_048_576, Tier::Premium),
            ],
            "gemini-3-pro-preview",
            "gemini-3-flash-preview",
        );
        let anthropic = ProviderCatalog::new(
            ProviderKind::Anthropic,
            vec![
                ModelEntry::new("claude-haiku-4", 0.80, 4.00, 200_000, Tier::Budget),
                ModelEntry::new("claude-sonnet-4-5", 3.00, 15.00, 200_000, Tier::Balanced),
                ModelEntry::new("claude-opus-4", 15.00, 75.00, 200_000, Tier::Premium),
            ],
            "claude-opus-4",
            "claude-sonnet-4-5",
        );
        let openai = ProviderCatalog::new(
            ProviderKind::OpenAi,
            vec![
                ModelEntry::new("gpt-4o-mini", 0.15, 0.60, 128_000, Tier::Budget),
                ModelEntry::new("gpt-4o", 2.50, 10.00, 128_000, Tier::Balanced),
                ModelEntry::new("o3", 10.00, 40.00, 200_000, Tier::Premium),
            ],
            "o3",
            "gpt-4o",
        );
        Self {
            providers: vec![google, anthropic, openai],
        }
    }

    /// Provider catalogs in definition order.
    pub fn providers(&self) -> &[ProviderCatalog] {
        &self.providers
    }

    /// Looks up a provider's models, failing with [`OrkestraError::UnknownProvider`].
    pub fn provider(&self, kind: ProviderKind) -> Result<&ProviderCatalog, OrkestraError> {
        self.providers
            .iter()
            .find(|p| p.provider == kind)
            .ok_or_else(|| OrkestraError::UnknownProvider(kind.to_string()))
    }

    /// Looks up a provider by name.
    pub fn get_models(&self, provider: &str) -> Result<&ProviderCatalog, OrkestraError> {
        self.provider(ProviderKind::from_name(provider)?)
    }

    /// Looks up one model of one provider.
    pub fn model(&self, provider: ProviderKind, model: &str) -> Result<&ModelEntry, OrkestraError> {
        self.provider(provider)?.model(model)
    }

    /// Dollar cost of a call, by provider and model name.
    pub fn cost(
        &self,
        provider: &str,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<f64, OrkestraError> {
        let entry = self.get_models(provider)?.model(model)?;
        Ok(crate::pricing::calculate_cost(
            &orkestra_core::TokenUsage {
                input_tokens,
                output_tokens,
            },
            entry,
        ))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
