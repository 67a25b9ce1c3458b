pub mod defaults;
mod evidence_config;
mod io_config;
mod pipeline_config;
mod repair_config;
mod vault_section;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use evidence_config::{EvidenceConfig, EvidenceDepth};
pub use io_config::{ManifestConfig, ResolverConfig};
pub use pipeline_config::{ObservabilityConfig, PipelineConfig};
pub use repair_config::RepairConfig;
pub use vault_section::VaultSection;

use crate::constants::MANIFESTS_DIR_NAME;
use crate::errors::{ConfigError, VaultResult};

/// Top-level configuration aggregating all sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub vault: VaultSection,
    pub manifest: ManifestConfig,
    pub resolver: ResolverConfig,
    pub repair: RepairConfig,
    pub evidence: EvidenceConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl VaultConfig {
    /// Parse from a TOML string. Missing sections and fields take defaults.
    pub fn from_toml(s: &str) -> VaultResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> VaultResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| crate::errors::VaultError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Config with a single default vault rooted at `root`.
    pub fn for_vault_root(root: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        let id = config.vault.default_vault.clone();
        config.vault.vault_roots.insert(id, root.into());
        config
    }

    pub fn validate(&self) -> VaultResult<()> {
        if self.manifest.write_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "manifest.write_retries".into(),
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.resolver.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.read_timeout_ms".into(),
                reason: "must be positive".into(),
            }
            .into());
        }
        if let Some((id, _)) = self
            .vault
            .vault_roots
            .iter()
            .find(|(id, _)| id.is_empty() || id.contains('/'))
        {
            return Err(ConfigError::InvalidValue {
                field: "vault.vault_roots".into(),
                reason: format!("bad vault id {id:?}"),
            }
            .into());
        }
        Ok(())
    }

    pub fn vault_root(&self, vault_id: &str) -> Option<&Path> {
        self.vault.vault_roots.get(vault_id).map(PathBuf::as_path)
    }

    /// Explicit `manifests_dir`, else `<default vault root>/manifests`.
    pub fn manifests_dir(&self) -> VaultResult<PathBuf> {
        if let Some(dir) = &self.manifest.manifests_dir {
            return Ok(dir.clone());
        }
        self.vault_root(&self.vault.default_vault)
            .map(|root| root.join(MANIFESTS_DIR_NAME))
            .ok_or_else(|| {
                ConfigError::MissingVaultRoot {
                    vault_id: self.vault.default_vault.clone(),
                }
                .into()
            })
    }

    pub fn journal_path(&self) -> PathBuf {
        self.pipeline
            .journal_path
            .clone()
            .unwrap_or_else(|| self.pipeline.runs_root.join(defaults::DEFAULT_JOURNAL_FILE))
    }

    /// JSON snapshot stored with every journaled run.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
