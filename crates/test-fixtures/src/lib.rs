//! Temporary vault builders for tests across the workspace.
//!
//! A [`TempVault`] owns a temp directory laid out as
//! `<tmp>/vault` (the `default` vault root) and `<tmp>/runs` (pipeline
//! runs root), plus a [`VaultConfig`] pointing at both. Helpers panic on
//! I/O failure; they are only ever used from tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vault_core::config::VaultConfig;
use vault_core::hashing;
use vault_core::models::{ManifestRecord, VaultUri};

pub struct TempVault {
    dir: TempDir,
    config: VaultConfig,
}

impl Default for TempVault {
    fn default() -> Self {
        Self::new()
    }
}

impl TempVault {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let root = dir.path().join("vault");
        std::fs::create_dir_all(&root).unwrap_or_else(|e| panic!("create vault root: {e}"));
        let mut config = VaultConfig::for_vault_root(&root);
        config.pipeline.runs_root = dir.path().join("runs");
        config.manifest.retry_backoff_ms = 0;
        config.resolver.retry_backoff_ms = 0;
        Self { dir, config }
    }

    /// Root of the `default` vault.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("vault")
    }

    pub fn tmp(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut VaultConfig {
        &mut self.config
    }

    pub fn manifests_dir(&self) -> PathBuf {
        self.config
            .manifests_dir()
            .unwrap_or_else(|e| panic!("manifests dir: {e}"))
    }

    /// Register another vault root named `vault_id` and return its path.
    pub fn add_root(&mut self, vault_id: &str) -> PathBuf {
        let root = self.dir.path().join(format!("vault-{vault_id}"));
        std::fs::create_dir_all(&root).unwrap_or_else(|e| panic!("create root: {e}"));
        self.config
            .vault
            .vault_roots
            .insert(vault_id.to_string(), root.clone());
        root
    }

    /// Write `bytes` at `rel` under the default root, creating parents.
    pub fn write(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        write_under(&self.root(), rel, bytes)
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.root().join(rel)).unwrap_or_else(|e| panic!("remove {rel}: {e}"));
    }

    /// Move a replica within the default root.
    pub fn rename(&self, from: &str, to: &str) -> PathBuf {
        let dest = self.root().join(to);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
        }
        std::fs::rename(self.root().join(from), &dest)
            .unwrap_or_else(|e| panic!("rename {from} -> {to}: {e}"));
        dest
    }

    /// Write a replica and build (but do not append) its manifest record.
    pub fn ingest(&self, uri: &str, rel: &str, bytes: &[u8]) -> ManifestRecord {
        self.write(rel, bytes);
        record(uri, rel, bytes)
    }
}

pub fn write_under(root: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir {rel}: {e}"));
    }
    std::fs::write(&path, bytes).unwrap_or_else(|e| panic!("write {rel}: {e}"));
    path
}

pub fn uri(s: &str) -> VaultUri {
    VaultUri::parse(s).unwrap_or_else(|e| panic!("bad uri {s}: {e}"))
}

/// A manifest record for content `bytes` stored at `rel`.
pub fn record(uri_str: &str, rel: &str, bytes: &[u8]) -> ManifestRecord {
    ManifestRecord::new(uri(uri_str), rel, hashing::hash(bytes), bytes.len() as u64)
}
