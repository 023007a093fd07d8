// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Orkestra.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Orkestra configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrkestraConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Embedding model settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Router artifact sources and cache.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Routing and generation defaults.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Embedding model configuration.
///
/// `max_length` is the truncation contract shared with classifier
/// training: changing it without retraining the router artifacts shifts
/// every embedding of long prompts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Name of the embedding model (used for the model directory name).
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Directory holding `model.onnx` and `tokenizer.json`.
    /// Defaults to `~/.orkestra/models/<model_name>`.
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// Download URL for the ONNX export of the model.
    #[serde(default = "default_model_url")]
    pub model_url: String,

    /// Download URL for the HuggingFace `tokenizer.json`.
    #[serde(default = "default_tokenizer_url")]
    pub tokenizer_url: String,

    /// Maximum number of tokens fed to the model; longer input is truncated.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Embedding width produced by the model.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// ONNX Runtime intra-op threads.
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            model_dir: None,
            model_url: default_model_url(),
            tokenizer_url: default_tokenizer_url(),
            max_length: default_max_length(),
            dimension: default_dimension(),
            intra_threads: default_intra_threads(),
        }
    }
}

impl EmbeddingConfig {
    /// Resolved model directory.
    pub fn resolved_model_dir(&self) -> PathBuf {
        self.model_dir.clone().unwrap_or_else(|| {
            data_root()
                .join("models")
                .join(self.model_name.replace('/', "--"))
        })
    }
}

fn default_model_name() -> String {
    "allenai/longformer-base-4096".to_string()
}

fn default_model_url() -> String {
    "https://huggingface.co/onnx-community/longformer-base-4096/resolve/main/onnx/model.onnx"
        .to_string()
}

fn default_tokenizer_url() -> String {
    "https://huggingface.co/onnx-community/longformer-base-4096/resolve/main/tokenizer.json"
        .to_string()
}

fn default_max_length() -> usize {
    4096
}

fn default_dimension() -> usize {
    768
}

fn default_intra_threads() -> usize {
    1
}

/// Router artifact cache and source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Cache directory for verified artifacts. Defaults to `~/.orkestra/routers`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Development fallback directory checked after the remote store.
    #[serde(default = "default_local_fallback_dir")]
    pub local_fallback_dir: Option<PathBuf>,

    /// Per-request timeout for remote fetches.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Extra attempts after a failed remote fetch.
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Google router artifact.
    #[serde(default = "default_google_artifact")]
    pub google: ArtifactSourceConfig,

    /// Anthropic router artifact.
    #[serde(default = "default_anthropic_artifact")]
    pub anthropic: ArtifactSourceConfig,

    /// OpenAI router artifact.
    #[serde(default = "default_openai_artifact")]
    pub openai: ArtifactSourceConfig,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            local_fallback_dir: default_local_fallback_dir(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_retries: default_fetch_retries(),
            google: default_google_artifact(),
            anthropic: default_anthropic_artifact(),
            openai: default_openai_artifact(),
        }
    }
}

impl ArtifactsConfig {
    /// Resolved cache directory.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| data_root().join("routers"))
    }
}

/// Where to find one provider's router artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSourceConfig {
    /// Remote URL. Empty disables the remote source.
    #[serde(default)]
    pub url: String,

    /// Pinned SHA-256 (lowercase hex) of the remote file.
    /// Remote fetch is skipped when unset.
    #[serde(default)]
    pub sha256: Option<String>,

    /// File name inside the cache and fallback directories.
    pub filename: String,

    /// Artifact version string.
    #[serde(default = "default_artifact_version")]
    pub version: String,
}

fn artifact_source(provider: &str) -> ArtifactSourceConfig {
    ArtifactSourceConfig {
        url: format!("http://imperativemachines.com/routers/router-{provider}.json"),
        sha256: None,
        filename: format!("router-{provider}.json"),
        version: default_artifact_version(),
    }
}

fn default_google_artifact() -> ArtifactSourceConfig {
    artifact_source("google")
}

fn default_anthropic_artifact() -> ArtifactSourceConfig {
    artifact_source("anthropic")
}

fn default_openai_artifact() -> ArtifactSourceConfig {
    artifact_source("openai")
}

fn default_artifact_version() -> String {
    "0.2.0".to_string()
}

fn default_local_fallback_dir() -> Option<PathBuf> {
    Some(PathBuf::from("routers"))
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_fetch_retries() -> u32 {
    1
}

/// Routing and generation defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Route each prompt through the tier classifier. When false, providers
    /// use their catalog fallback model.
    #[serde(default = "default_smart_routing")]
    pub smart_routing: bool,

    /// Strategy used by multi-provider selection when none is given.
    #[serde(default = "default_strategy")]
    pub default_strategy: String,

    /// Maximum output tokens requested from backends.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature requested from backends.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            smart_routing: default_smart_routing(),
            default_strategy: default_strategy(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_smart_routing() -> bool {
    true
}

fn default_strategy() -> String {
    "cheapest".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    1.0
}

/// Root of Orkestra's per-user data (`~/.orkestra`).
fn data_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".orkestra")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = OrkestraConfig::default();
        assert_eq!(config.embedding.max_length, 4096);
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.routing.default_strategy, "cheapest");
        assert_eq!(config.routing.max_tokens, 8192);
        assert!(config.routing.smart_routing);
        assert_eq!(config.artifacts.google.filename, "router-google.json");
        assert_eq!(config.artifacts.openai.version, "0.2.0");
        assert!(config.artifacts.anthropic.sha256.is_none());
    }

    #[test]
    fn cache_dir_defaults_under_data_root() {
        let config = ArtifactsConfig::default();
        assert!(config.resolved_cache_dir().ends_with(".orkestra/routers"));

        let custom = ArtifactsConfig {
            cache_dir: Some(PathBuf::from("/tmp/ork")),
            ..ArtifactsConfig::default()
        };
        assert_eq!(custom.resolved_cache_dir(), PathBuf::from("/tmp/ork"));
    }

    #[test]
    fn model_dir_flattens_model_name() {
        let config = EmbeddingConfig::default();
        assert!(
            config
                .resolved_model_dir()
                .ends_with("models/allenai--longformer-base-4096")
        );
    }

    #[test]
    fn partial_artifact_section_keeps_other_defaults() {
        let toml_str = r#"
[artifacts.google]
filename = "custom-google.json"
sha256 = "abc"
"#;
        let config: OrkestraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.artifacts.google.filename, "custom-google.json");
        assert_eq!(config.artifacts.google.url, "");
        assert_eq!(config.artifacts.google.version, "0.2.0");
        assert_eq!(config.artifacts.openai.filename, "router-openai.json");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = toml::from_str::<OrkestraConfig>("[telemetry]\nenabled = true\n");
        assert!(result.is_err());
    }
}
