use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use vault_core::config::VaultConfig;
use vault_core::models::VaultUri;

/// Maps replica paths onto mounted vault roots.
#[derive(Debug, Clone, Default)]
pub struct ReplicaLocator {
    roots: BTreeMap<String, PathBuf>,
}

impl ReplicaLocator {
    pub fn new(roots: BTreeMap<String, PathBuf>) -> Self {
        Self { roots }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(config.vault.vault_roots.clone())
    }

    pub fn roots(&self) -> &BTreeMap<String, PathBuf> {
        &self.roots
    }

    pub fn root(&self, vault_id: &str) -> Option<&Path> {
        self.roots.get(vault_id).map(PathBuf::as_path)
    }

    /// Absolute replica paths are used as-is; relative ones are joined to
    /// the root of the identifier's vault. `None` when that vault is not
    /// mounted.
    pub fn locate(&self, logical_id: &VaultUri, replica_path: &str) -> Option<PathBuf> {
        let path = Path::new(replica_path);
        if path.is_absolute() {
            return Some(path.to_path_buf());
        }
        self.root(logical_id.vault_id()).map(|root| root.join(path))
    }

    /// Where an identifier would live if stored under its own name.
    pub fn canonical_path(&self, logical_id: &VaultUri) -> Option<PathBuf> {
        self.root(logical_id.vault_id())
            .map(|root| root.join(logical_id.relative_path()))
    }

    /// Inverse of [`locate`](Self::locate): a path relative to the vault
    /// root when it lies under it, else the absolute path.
    pub fn replica_path_for(&self, vault_id: &str, path: &Path) -> String {
        match self.root(vault_id).and_then(|root| path.strip_prefix(root).ok()) {
            Some(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            None => path.to_string_lossy().into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> ReplicaLocator {
        let mut roots = BTreeMap::new();
        roots.insert("default".to_string(), PathBuf::from("/v"));
        ReplicaLocator::new(roots)
    }

    #[test]
    fn relative_paths_join_the_vault_root() {
        let uri = VaultUri::parse("vault://default/mu/a.mimo").unwrap();
        assert_eq!(
            locator().locate(&uri, "mu/a.mimo"),
            Some(PathBuf::from("/v/mu/a.mimo"))
        );
        assert_eq!(
            locator().canonical_path(&uri),
            Some(PathBuf::from("/v/mu/a.mimo"))
        );
    }

    #[test]
    fn unmounted_vault_has_no_location() {
        let uri = VaultUri::parse("vault://laptop/raw/a").unwrap();
        assert_eq!(locator().locate(&uri, "raw/a"), None);
    }

    #[test]
    fn absolute_paths_pass_through() {
        let uri = VaultUri::parse("vault://laptop/raw/a").unwrap();
        assert_eq!(
            locator().locate(&uri, "/elsewhere/a"),
            Some(PathBuf::from("/elsewhere/a"))
        );
    }

    #[test]
    fn replica_path_for_strips_the_root() {
        assert_eq!(
            locator().replica_path_for("default", Path::new("/v/raw/x/y.txt")),
            "raw/x/y.txt"
        );
    }
}
