// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Orkestra model routing.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and Elm-style diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use orkestra_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Default strategy: {}", config.routing.default_strategy);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    ArtifactSourceConfig, ArtifactsConfig, EmbeddingConfig, LoggingConfig, OrkestraConfig,
    RoutingConfig,
};

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<OrkestraConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<OrkestraConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<OrkestraConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_FILE) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_FILE).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    let system_path = std::path::Path::new(loader::SYSTEM_CONFIG_PATH);
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typo_in_section_gets_suggestion() {
        let toml = "[artifacts.google]\nfilename = \"g.json\"\nsha265 = \"x\"\n";
        let errors = load_and_validate_str(toml).unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => {
                assert_eq!(key, "sha265");
                assert_eq!(suggestion.as_deref(), Some("sha256"));
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_reported() {
        let errors = load_and_validate_str("[routing]\nmax_tokens = \"many\"\n").unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigError::InvalidType { key, .. } if key == "routing.max_tokens"
        ));
    }

    #[test]
    fn validation_runs_after_parse() {
        let errors = load_and_validate_str("[routing]\ndefault_strategy = \"fastest\"\n")
            .unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigError::Validation { message } if message.contains("fastest")
        ));
    }

    #[test]
    fn valid_inline_config_loads() {
        let config = load_and_validate_str(
            r#"
[logging]
level = "debug"

[embedding]
intra_threads = 4

[artifacts]
local_fallback_dir = "fixtures/routers"
"#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.embedding.intra_threads, 4);
        assert_eq!(
            config.artifacts.local_fallback_dir,
            Some(std::path::PathBuf::from("fixtures/routers"))
        );
    }

    #[test]
    fn load_and_validate_reads_local_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("orkestra.toml", "[routing]\ndefault_strategy = \"balanced\"\n")?;
            let config = load_and_validate().map_err(|e| e[0].to_string())?;
            assert_eq!(config.routing.default_strategy, "balanced");
            Ok(())
        });
    }
}
