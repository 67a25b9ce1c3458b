//! Logical identifiers for vault content.
//!
//! # Examples
//!
//! ```
//! use vault_core::models::{VaultKind, VaultUri};
//!
//! let uri = VaultUri::parse("vault://default/raw/2026/02/21/foo.md").unwrap();
//! assert_eq!(uri.vault_id(), "default");
//! assert_eq!(uri.kind(), VaultKind::Raw);
//! assert_eq!(uri.path(), "2026/02/21/foo.md");
//! assert_eq!(uri.to_string(), "vault://default/raw/2026/02/21/foo.md");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::VAULT_URI_SCHEME;
use crate::errors::{VaultError, VaultResult};

/// The six content kinds a vault namespace is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultKind {
    Raw,
    Mu,
    Assets,
    Manifests,
    Logs,
    Derived,
}

impl VaultKind {
    pub const ALL: [VaultKind; 6] = [
        VaultKind::Raw,
        VaultKind::Mu,
        VaultKind::Assets,
        VaultKind::Manifests,
        VaultKind::Logs,
        VaultKind::Derived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Mu => "mu",
            Self::Assets => "assets",
            Self::Manifests => "manifests",
            Self::Logs => "logs",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for VaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VaultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("invalid kind {s:?}"))
    }
}

/// A stable, opaque logical identifier: `vault://<vault_id>/<kind>/<path>`.
///
/// Consumers never interpret it as a filesystem path. Only the replica
/// locator maps it onto a vault root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultUri {
    vault_id: String,
    kind: VaultKind,
    path: String,
}

impl VaultUri {
    pub fn new(vault_id: &str, kind: VaultKind, path: &str) -> VaultResult<Self> {
        let path = path
            .split('/')
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        if vault_id.is_empty() || vault_id.contains('/') {
            return Err(invalid(&format!("{vault_id}/{kind}/{path}"), "bad vault id"));
        }
        if path.is_empty() {
            return Err(invalid(&format!("{vault_id}/{kind}/"), "empty path"));
        }
        if path.split('/').any(|seg| seg == "..") {
            return Err(invalid(&path, "path escapes its kind"));
        }
        Ok(Self {
            vault_id: vault_id.to_string(),
            kind,
            path,
        })
    }

    /// Parse `vault://<vault_id>/<kind>/<path...>`.
    pub fn parse(uri: &str) -> VaultResult<Self> {
        let rest = uri
            .strip_prefix(VAULT_URI_SCHEME)
            .ok_or_else(|| invalid(uri, "not a vault uri"))?;
        let parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() < 3 {
            return Err(invalid(uri, "need vault_id/kind/path"));
        }
        let kind = parts[1]
            .parse::<VaultKind>()
            .map_err(|reason| invalid(uri, &reason))?;
        Self::new(parts[0], kind, &parts[2..].join("/"))
    }

    pub fn vault_id(&self) -> &str {
        &self.vault_id
    }

    pub fn kind(&self) -> VaultKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `<kind>/<path>`, the location of the content relative to a vault root.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.kind, self.path)
    }
}

fn invalid(uri: &str, reason: &str) -> VaultError {
    VaultError::InvalidUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for VaultUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{VAULT_URI_SCHEME}{}/{}/{}", self.vault_id, self.kind, self.path)
    }
}

impl FromStr for VaultUri {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VaultUri {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).map_err(|e| e.to_string())
    }
}

impl From<VaultUri> for String {
    fn from(value: VaultUri) -> Self {
        value.to_string()
    }
}
