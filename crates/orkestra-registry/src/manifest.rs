// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serializable per-provider description of models, pricing and routers.

use orkestra_core::{ProviderKind, Tier};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// Everything a caller needs to know about the configured providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub providers: Vec<ProviderManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderManifest {
    pub provider: ProviderKind,
    pub base_model: String,
    pub fallback_model: String,
    pub models: Vec<ModelManifest>,
    /// Router artifact for this provider, when one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    pub input_price_per_million: f64,
    pub output_price_per_million: f64,
    pub context_window: u64,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub filename: String,
    pub version: String,
}

impl Manifest {
    /// Describes every provider in `catalog`, without artifact information.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let providers = catalog
            .providers()
            .iter()
            .map(|p| ProviderManifest {
                provider: p.provider(),
                base_model: p.base_model().to_string(),
                fallback_model: p.fallback_model().to_string(),
                models: p
                    .models()
                    .iter()
                    .map(|m| ModelManifest {
                        name: m.name.clone(),
                        input_price_per_million: m.input_price_per_million,
                        output_price_per_million: m.output_price_per_million,
                        context_window: m.context_window,
                        tier: m.tier,
                    })
                    .collect(),
                artifact: None,
            })
            .collect();
        Self { providers }
    }

    /// Attaches router artifact information to one provider's entry.
    pub fn with_artifact(mut self, provider: ProviderKind, artifact: ArtifactInfo) -> Self {
        if let Some(entry) = self.providers.iter_mut().find(|p| p.provider == provider) {
            entry.artifact = Some(artifact);
        }
        self
    }

    pub fn provider(&self, provider: ProviderKind) -> Option<&ProviderManifest> {
        self.providers.iter().find(|p| p.provider == provider)
    }
}
