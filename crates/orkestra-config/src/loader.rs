// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./orkestra.toml` > `~/.config/orkestra/orkestra.toml` >
//! `/etc/orkestra/orkestra.toml`
//! with environment variable overrides via `ORKESTRA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OrkestraConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/orkestra/orkestra.toml";

/// Local configuration file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "orkestra.toml";

/// Top-level sections that environment variables can address.
const SECTIONS: [&str; 4] = ["logging", "embedding", "artifacts", "routing"];

/// Provider subsections of `[artifacts]`.
const ARTIFACT_PROVIDERS: [&str; 3] = ["google", "anthropic", "openai"];

/// Path of the per-user XDG config file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("orkestra/orkestra.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/orkestra/orkestra.toml` (system-wide)
/// 3. `~/.config/orkestra/orkestra.toml` (user XDG config)
/// 4. `./orkestra.toml` (local directory)
/// 5. `ORKESTRA_*` environment variables
pub fn load_config() -> Result<OrkestraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<OrkestraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OrkestraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OrkestraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OrkestraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OrkestraConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `ORKESTRA_ROUTING_SMART_ROUTING` must map to
/// `routing.smart_routing` and `ORKESTRA_ARTIFACTS_GOOGLE_SHA256` to
/// `artifacts.google.sha256`.
fn env_provider() -> Env {
    Env::prefixed("ORKESTRA_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        else {
            continue;
        };
        if section == "artifacts" {
            for provider in ARTIFACT_PROVIDERS {
                if let Some(field) = rest
                    .strip_prefix(provider)
                    .and_then(|r| r.strip_prefix('_'))
                {
                    return format!("artifacts.{provider}.{field}");
                }
            }
        }
        return format!("{section}.{rest}");
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(
            map_env_key("routing_smart_routing"),
            "routing.smart_routing"
        );
        assert_eq!(map_env_key("embedding_max_length"), "embedding.max_length");
        assert_eq!(map_env_key("artifacts_cache_dir"), "artifacts.cache_dir");
        assert_eq!(
            map_env_key("artifacts_google_sha256"),
            "artifacts.google.sha256"
        );
        assert_eq!(
            map_env_key("artifacts_openai_filename"),
            "artifacts.openai.filename"
        );
    }

    #[test]
    fn unmapped_keys_pass_through() {
        assert_eq!(map_env_key("telemetry_enabled"), "telemetry_enabled");
    }

    #[test]
    fn file_and_env_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
[routing]
default_strategy = "smartest"
max_tokens = 1024

[artifacts.anthropic]
filename = "router-anthropic.json"
sha256 = "0000000000000000000000000000000000000000000000000000000000000000"
"#,
            )?;
            jail.set_env("ORKESTRA_ROUTING_MAX_TOKENS", "2048");
            jail.set_env("ORKESTRA_ARTIFACTS_FETCH_RETRIES", "3");
            jail.set_env("ORKESTRA_ROUTING_SMART_ROUTING", "false");

            let config = load_config()?;
            assert_eq!(config.routing.default_strategy, "smartest");
            assert_eq!(config.routing.max_tokens, 2048);
            assert!(!config.routing.smart_routing);
            assert_eq!(config.artifacts.fetch_retries, 3);
            assert!(config.artifacts.anthropic.sha256.is_some());
            assert_eq!(config.embedding.max_length, 4096);
            Ok(())
        });
    }

    #[test]
    fn explicit_path_ignores_local_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(LOCAL_CONFIG_FILE, "[logging]\nlevel = \"trace\"\n")?;
            jail.create_file("custom.toml", "[logging]\nlevel = \"debug\"\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }
}
