use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Manifest ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Defaults to `<default vault root>/manifests`.
    pub manifests_dir: Option<PathBuf>,
    /// Append attempts before surfacing `WriteFailed`.
    pub write_retries: u32,
    /// Base backoff, doubled per attempt.
    pub retry_backoff_ms: u64,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            manifests_dir: None,
            write_retries: defaults::DEFAULT_MANIFEST_WRITE_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_MANIFEST_RETRY_BACKOFF_MS,
        }
    }
}

/// Replica read bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub read_timeout_ms: u64,
    pub read_retries: u32,
    pub retry_backoff_ms: u64,
}

impl ResolverConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: defaults::DEFAULT_READ_TIMEOUT_MS,
            read_retries: defaults::DEFAULT_READ_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_READ_RETRY_BACKOFF_MS,
        }
    }
}
