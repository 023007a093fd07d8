// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as known strategy names, checksum shape, and positive sizes.

use crate::diagnostic::ConfigError;
use crate::model::{ArtifactSourceConfig, OrkestraConfig};

/// Strategy names accepted by `routing.default_strategy`.
pub const KNOWN_STRATEGIES: [&str; 3] = ["cheapest", "smartest", "balanced"];

/// Accepted `logging.level` values.
pub const KNOWN_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &OrkestraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.to_ascii_lowercase();
    if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` is not one of: {}",
            config.logging.level,
            KNOWN_LOG_LEVELS.join(", ")
        )));
    }

    let embedding = &config.embedding;
    for (key, value) in [
        ("embedding.max_length", embedding.max_length),
        ("embedding.dimension", embedding.dimension),
        ("embedding.intra_threads", embedding.intra_threads),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be positive, got 0"
            )));
        }
    }
    if embedding.model_name.trim().is_empty() {
        errors.push(ConfigError::validation(
            "embedding.model_name must not be empty",
        ));
    }

    if config.artifacts.fetch_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "artifacts.fetch_timeout_secs must be positive, got 0",
        ));
    }
    for (provider, source) in [
        ("google", &config.artifacts.google),
        ("anthropic", &config.artifacts.anthropic),
        ("openai", &config.artifacts.openai),
    ] {
        validate_artifact_source(provider, source, &mut errors);
    }

    let routing = &config.routing;
    if !KNOWN_STRATEGIES.contains(&routing.default_strategy.as_str()) {
        errors.push(ConfigError::validation(format!(
            "routing.default_strategy `{}` is not one of: {}",
            routing.default_strategy,
            KNOWN_STRATEGIES.join(", ")
        )));
    }
    if routing.max_tokens == 0 {
        errors.push(ConfigError::validation(
            "routing.max_tokens must be positive, got 0",
        ));
    }
    if !(0.0..=2.0).contains(&routing.temperature) {
        errors.push(ConfigError::validation(format!(
            "routing.temperature must be within [0, 2], got {}",
            routing.temperature
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_artifact_source(
    provider: &str,
    source: &ArtifactSourceConfig,
    errors: &mut Vec<ConfigError>,
) {
    let filename = source.filename.trim();
    if filename.is_empty() {
        errors.push(ConfigError::validation(format!(
            "artifacts.{provider}.filename must not be empty"
        )));
    } else if filename.contains('/') || filename.contains('\\') || filename == ".." {
        errors.push(ConfigError::validation(format!(
            "artifacts.{provider}.filename `{filename}` must be a bare file name"
        )));
    }

    if let Some(digest) = &source.sha256 {
        if !is_sha256_hex(digest) {
            errors.push(ConfigError::validation(format!(
                "artifacts.{provider}.sha256 must be 64 lowercase hex characters"
            )));
        }
    }
}

fn is_sha256_hex(digest: &str) -> bool {
    digest.len() == 64
        && digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
