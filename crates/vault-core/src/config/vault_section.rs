use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VAULT_ID;

/// Where each vault lives on this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSection {
    /// vault_id -> physical root directory.
    pub vault_roots: BTreeMap<String, PathBuf>,
    pub default_vault: String,
}

impl Default for VaultSection {
    fn default() -> Self {
        Self {
            vault_roots: BTreeMap::new(),
            default_vault: DEFAULT_VAULT_ID.to_string(),
        }
    }
}
