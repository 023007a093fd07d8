// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the catalog, router and provider facades.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::OrkestraError;

/// A hosted language-model provider.
///
/// The set is closed: unknown names are rejected at the boundary by
/// [`ProviderKind::from_name`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Anthropic,
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Every supported provider, in declaration order.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Google,
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
    ];

    /// Parses a provider name, failing with [`OrkestraError::UnknownProvider`].
    pub fn from_name(name: &str) -> Result<Self, OrkestraError> {
        name.parse()
            .map_err(|_| OrkestraError::UnknownProvider(name.to_string()))
    }

    /// The lowercase wire name (`google`, `anthropic`, `openai`).
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Pricing tier of a model.
///
/// Totally ordered `Budget < Balanced < Premium`; the derived ordering is
/// the tier rank used by selection strategies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Budget = 0,
    Balanced = 1,
    Premium = 2,
}

impl Tier {
    /// Every tier, lowest rank first.
    pub const ALL: [Tier; 3] = [Tier::Budget, Tier::Balanced, Tier::Premium];

    /// Fixed rank: budget 0, balanced 1, premium 2.
    pub const fn rank(self) -> u8 {
        self as u8
    }
}

/// One provider's routed model for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub provider: ProviderKind,
    pub model: String,
}

impl RoutingDecision {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

/// The winning provider and model chosen by a selection strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionResult {
    pub provider: ProviderKind,
    pub model: String,
}

/// Token usage reported by a generation backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A text generation request sent to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A completed, non-streaming generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}
