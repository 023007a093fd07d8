// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router artifact resolution: cache, then verified download, then local copy.
//!
//! Whichever source wins is placed in the cache directory, so later runs
//! resolve from the cache without touching the network. A cached copy that
//! no longer matches the pinned digest is treated as stale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use orkestra_config::{ArtifactSourceConfig, ArtifactsConfig};
use orkestra_core::{OrkestraError, ProviderKind};
use tracing::{debug, info, instrument, warn};

use crate::fetch::{FetchPolicy, Fetcher, verify_sha256, write_atomic};

/// Where one provider's artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Remote URL; empty disables the remote source.
    pub url: String,
    /// Pinned lowercase hex SHA-256 of the remote file.
    pub sha256: Option<String>,
    /// Bare file name used in the cache and fallback directories.
    pub filename: String,
    pub version: String,
}

impl From<&ArtifactSourceConfig> for ArtifactEntry {
    fn from(source: &ArtifactSourceConfig) -> Self {
        Self {
            url: source.url.clone(),
            sha256: source.sha256.clone(),
            filename: source.filename.clone(),
            version: source.version.clone(),
        }
    }
}

/// Artifact entries keyed by provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactManifest {
    entries: BTreeMap<ProviderKind, ArtifactEntry>,
}

impl ArtifactManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self::new()
            .with(ProviderKind::Google, (&config.google).into())
            .with(ProviderKind::Anthropic, (&config.anthropic).into())
            .with(ProviderKind::OpenAi, (&config.openai).into())
    }

    pub fn with(mut self, provider: ProviderKind, entry: ArtifactEntry) -> Self {
        self.entries.insert(provider, entry);
        self
    }

    /// Entry for `provider`, or [`OrkestraError::UnsupportedProvider`].
    pub fn entry(&self, provider: ProviderKind) -> Result<&ArtifactEntry, OrkestraError> {
        self.entries
            .get(&provider)
            .ok_or_else(|| OrkestraError::UnsupportedProvider(provider.to_string()))
    }

    pub fn providers(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.entries.keys().copied()
    }
}

/// Resolves router artifacts to readable files in the cache directory.
pub struct ArtifactStore {
    cache_dir: PathBuf,
    local_fallback_dir: Option<PathBuf>,
    manifest: ArtifactManifest,
    fetcher: Fetcher,
}

impl ArtifactStore {
    pub fn new(
        cache_dir: PathBuf,
        local_fallback_dir: Option<PathBuf>,
        manifest: ArtifactManifest,
        fetcher: Fetcher,
    ) -> Self {
        Self {
            cache_dir,
            local_fallback_dir,
            manifest,
            fetcher,
        }
    }

    pub fn from_config(config: &ArtifactsConfig) -> Result<Self, OrkestraError> {
        Ok(Self::new(
            config.resolved_cache_dir(),
            config.local_fallback_dir.clone(),
            ArtifactManifest::from_config(config),
            Fetcher::new(FetchPolicy::from_config(config))?,
        ))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    /// Path of `provider`'s artifact inside the cache directory.
    pub fn cached_path(&self, provider: ProviderKind) -> Result<PathBuf, OrkestraError> {
        Ok(self.cache_dir.join(&self.manifest.entry(provider)?.filename))
    }

    /// Returns a readable artifact path for `provider`.
    ///
    /// Sources are tried in order: the cache (checked against the pinned
    /// digest when there is one), a remote download verified against that
    /// digest, then the local fallback directory. A
    /// failing source is logged and the next one is tried; only when all
    /// are exhausted does this fail with [`OrkestraError::ArtifactNotFound`].
    #[instrument(skip(self), fields(provider = %provider))]
    pub async fn resolve(&self, provider: ProviderKind) -> Result<PathBuf, OrkestraError> {
        let entry = self.manifest.entry(provider)?;
        let cached = self.cache_dir.join(&entry.filename);
        let mut attempts = Vec::new();

        match self.check_cached(entry, &cached).await {
            Ok(()) => {
                debug!(path = %cached.display(), "router artifact found in cache");
                return Ok(cached);
            }
            Err(reason) => {
                if tokio::fs::try_exists(&cached).await.unwrap_or(false) {
                    warn!(reason = %reason, "cached router artifact is stale, refetching");
                }
                attempts.push(format!("cache: {reason}"));
            }
        }

        match self.fetch_remote(entry, &cached).await {
            Ok(()) => return Ok(cached),
            Err(reason) => {
                warn!(
                    reason = %reason,
                    "remote router artifact unavailable, trying local fallback"
                );
                attempts.push(format!("remote: {reason}"));
            }
        }

        match self.copy_local_fallback(entry, &cached).await {
            Ok(()) => return Ok(cached),
            Err(reason) => attempts.push(format!("local fallback: {reason}")),
        }

        Err(OrkestraError::ArtifactNotFound {
            provider: provider.to_string(),
            attempts,
        })
    }

    async fn check_cached(&self, entry: &ArtifactEntry, cached: &Path) -> Result<(), String> {
        let Some(sha256) = entry.sha256.as_deref() else {
            return if tokio::fs::try_exists(cached).await.unwrap_or(false) {
                Ok(())
            } else {
                Err(format!("{} does not exist", cached.display()))
            };
        };
        let bytes = match tokio::fs::read(cached).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(format!("{} does not exist", cached.display()));
            }
            Err(e) => return Err(format!("{}: {e}", cached.display())),
        };
        verify_sha256(&bytes, sha256, cached).map_err(|e| e.to_string())
    }

    async fn fetch_remote(&self, entry: &ArtifactEntry, dest: &Path) -> Result<(), String> {
        if entry.url.is_empty() {
            return Err("no URL configured".into());
        }
        let Some(sha256) = entry.sha256.as_deref() else {
            return Err(format!("no sha256 pinned for {}", entry.url));
        };

        let size = self
            .fetcher
            .download(&entry.url, Some(sha256), dest)
            .await
            .map_err(|e| e.to_string())?;
        info!(
            url = %entry.url,
            version = %entry.version,
            bytes = size,
            "router artifact downloaded and verified"
        );
        Ok(())
    }

    async fn copy_local_fallback(&self, entry: &ArtifactEntry, dest: &Path) -> Result<(), String> {
        let Some(dir) = self.local_fallback_dir.as_deref() else {
            return Err("no fallback directory configured".into());
        };
        let source = dir.join(&entry.filename);
        let bytes = tokio::fs::read(&source)
            .await
            .map_err(|e| format!("{}: {e}", source.display()))?;
        write_atomic(dest, bytes).await.map_err(|e| e.to_string())?;
        info!(source = %source.display(), "router artifact copied from local fallback");
        Ok(())
    }
}
