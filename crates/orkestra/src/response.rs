// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generated text together with the model that produced it and its cost.

use std::fmt;

use orkestra_core::ProviderKind;
use orkestra_registry::CostBreakdown;
use serde::Serialize;

/// Result of a `chat` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub text: String,
    pub model: String,
    pub provider: ProviderKind,
    /// Total dollars for this call.
    pub cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    /// Dollars saved against `base_model` for the same usage.
    pub savings: f64,
    pub savings_percent: f64,
    pub base_model: String,
    pub base_cost: f64,
}

impl Response {
    pub fn new(text: String, breakdown: CostBreakdown) -> Self {
        Self {
            text,
            model: breakdown.model,
            provider: breakdown.provider,
            cost: breakdown.cost,
            input_tokens: breakdown.input_tokens,
            output_tokens: breakdown.output_tokens,
            input_cost: breakdown.input_cost,
            output_cost: breakdown.output_cost,
            savings: breakdown.savings,
            savings_percent: breakdown.savings_percent,
            base_model: breakdown.base_model,
            base_cost: breakdown.base_cost,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orkestra_core::TokenUsage;
    use orkestra_registry::Catalog;

    #[test]
    fn response_carries_breakdown_and_displays_text() {
        let breakdown = CostBreakdown::compute(
            &Catalog::builtin(),
            ProviderKind::Google,
            "gemini-2.5-flash-lite",
            TokenUsage {
                input_tokens: 500,
                output_tokens: 1000,
            },
        )
        .unwrap();
        let response = Response::new("hello".into(), breakdown);

        assert_eq!(response.to_string(), "hello");
        assert_eq!(response.model, "gemini-2.5-flash-lite");
        assert_eq!(response.base_model, "gemini-3-pro-preview");
        assert!((response.cost - 0.00045).abs() < 1e-12);
        assert!(response.savings > 0.0);
    }
}
