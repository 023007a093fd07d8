// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost calculation and savings against the provider's base model.

use orkestra_core::{OrkestraError, ProviderKind, TokenUsage};
use serde::Serialize;

use crate::catalog::{Catalog, ModelEntry};

const PER_MILLION: f64 = 1_000_000.0;

/// Calculate cost in USD for a given token usage and model entry.
///
/// Formula: `(input_tokens * input_price + output_tokens * output_price) / 1_000_000`.
/// Linear in the token counts and exactly zero for zero tokens.
pub fn calculate_cost(usage: &TokenUsage, entry: &ModelEntry) -> f64 {
    (usage.input_tokens as f64 * entry.input_price_per_million
        + usage.output_tokens as f64 * entry.output_price_per_million)
        / PER_MILLION
}

/// Per-call cost figures, including savings relative to a base model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub provider: ProviderKind,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub cost: f64,
    pub base_model: String,
    pub base_cost: f64,
    pub savings: f64,
    pub savings_percent: f64,
}

impl CostBreakdown {
    /// Costs `model` for `usage` and compares against the provider's base model.
    ///
    /// `savings_percent` is 0 when the base cost is 0.
    pub fn compute(
        catalog: &Catalog,
        provider: ProviderKind,
        model: &str,
        usage: TokenUsage,
    ) -> Result<Self, OrkestraError> {
        let provider_catalog = catalog.provider(provider)?;
        let base_model = provider_catalog.base_model();
        let base_cost = calculate_cost(&usage, provider_catalog.model(base_model)?);
        let entry = provider_catalog.model(model)?;
        let mut breakdown = Self::against(entry, provider, usage, base_model, base_cost);
        breakdown.savings = base_cost - breakdown.cost;
        breakdown.savings_percent = if base_cost > 0.0 {
            breakdown.savings / base_cost * 100.0
        } else {
            0.0
        };
        Ok(breakdown)
    }

    /// Costs `model` with itself as the base: zero savings.
    ///
    /// Used when the model was chosen across providers, where a single
    /// provider's base model is not a meaningful reference.
    pub fn without_savings(
        catalog: &Catalog,
        provider: ProviderKind,
        model: &str,
        usage: TokenUsage,
    ) -> Result<Self, OrkestraError> {
        let entry = catalog.model(provider, model)?;
        let cost = calculate_cost(&usage, entry);
        Ok(Self::against(entry, provider, usage, model, cost))
    }

    fn against(
        entry: &ModelEntry,
        provider: ProviderKind,
        usage: TokenUsage,
        base_model: &str,
        base_cost: f64,
    ) -> Self {
        let input_cost = usage.input_tokens as f64 * entry.input_price_per_million / PER_MILLION;
        let output_cost =
            usage.output_tokens as f64 * entry.output_price_per_million / PER_MILLION;
        Self {
            provider,
            model: entry.name.clone(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            input_cost,
            output_cost,
            cost: calculate_cost(&usage, entry),
            base_model: base_model.to_string(),
            base_cost,
            savings: 0.0,
            savings_percent: 0.0,
        }
    }
}
