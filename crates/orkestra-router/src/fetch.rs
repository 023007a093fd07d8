// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP download with bounded retries, SHA-256 verification, and atomic writes.
//!
//! Every file that lands in a cache directory is written to a temporary file
//! in the same directory and renamed into place, so readers never observe a
//! partially written file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use orkestra_config::ArtifactsConfig;
use orkestra_core::OrkestraError;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Timeout and retry bounds for remote fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Delay between attempts.
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 1,
            backoff: Duration::from_secs(1),
        }
    }
}

impl FetchPolicy {
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            retries: config.fetch_retries,
            ..Self::default()
        }
    }
}

/// HTTP client applying a [`FetchPolicy`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: FetchPolicy,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self, OrkestraError> {
        let client = reqwest::Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| OrkestraError::ArtifactFetch {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Fetches `url`, retrying connection failures and transient statuses
    /// (429, 5xx) up to `policy.retries` times.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, OrkestraError> {
        let mut last_error = None;

        for attempt in 0..=self.policy.retries {
            if attempt > 0 {
                warn!(attempt, url, "retrying fetch after transient error");
                tokio::time::sleep(self.policy.backoff).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(url, error = %e, "fetch request failed");
                    last_error = Some(OrkestraError::ArtifactFetch {
                        message: format!("request to {url} failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                    continue;
                }
            };

            let status = response.status();
            debug!(status = %status, attempt, url, "fetch response received");

            if status.is_success() {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| OrkestraError::ArtifactFetch {
                        message: format!("failed to read body from {url}: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(bytes.to_vec());
            }

            let error = OrkestraError::ArtifactFetch {
                message: format!("{url} returned {status}"),
                source: None,
            };
            if !is_transient_status(status) {
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| OrkestraError::ArtifactFetch {
            message: format!("fetch of {url} failed after retries"),
            source: None,
        }))
    }

    /// Downloads `url` into `dest`, verifying the body against `expected_sha256`
    /// (when given) before the file becomes visible. Returns the byte count.
    pub async fn download(
        &self,
        url: &str,
        expected_sha256: Option<&str>,
        dest: &Path,
    ) -> Result<usize, OrkestraError> {
        let bytes = self.get_bytes(url).await?;
        if let Some(expected) = expected_sha256 {
            verify_sha256(&bytes, expected, dest)?;
        }
        let size = bytes.len();
        write_atomic(dest, bytes).await?;
        Ok(size)
    }
}

/// Returns true for HTTP statuses worth retrying.
fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Fails with [`OrkestraError::ChecksumMismatch`] unless `bytes` hash to `expected`.
pub fn verify_sha256(bytes: &[u8], expected: &str, dest: &Path) -> Result<(), OrkestraError> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(OrkestraError::ChecksumMismatch {
            filename: file_label(dest),
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Writes `bytes` to `dest` through a temp file in the same directory and an
/// atomic rename. Creates the parent directory if needed.
pub async fn write_atomic(dest: &Path, bytes: Vec<u8>) -> Result<(), OrkestraError> {
    let dest: PathBuf = dest.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&dest, &bytes))
        .await
        .map_err(|e| OrkestraError::io("<atomic write>", std::io::Error::other(e)))?
}

fn write_atomic_blocking(dest: &Path, bytes: &[u8]) -> Result<(), OrkestraError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| OrkestraError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| OrkestraError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| OrkestraError::io(tmp.path(), e))?;
    tmp.persist(dest)
        .map_err(|e| OrkestraError::io(dest, e.error))?;
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
