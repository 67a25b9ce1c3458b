use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_REPLICA_ROLE;
use crate::hashing::ContentHash;
use crate::models::VaultUri;

/// One line of a kind manifest: a logical identifier mapped to a physical replica.
///
/// Records are never edited once appended. `superseded_by` is not written by
/// the appender; the ledger derives it from later records' `supersedes` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub record_id: Uuid,
    pub logical_id: VaultUri,
    /// Relative paths are resolved against the vault root of `logical_id`.
    pub replica_path: String,
    #[serde(default = "default_role")]
    pub replica_role: String,
    pub content_hash: ContentHash,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub superseded_by: Option<VaultUri>,
    /// Record ids this record replaced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supersedes: Vec<Uuid>,
    /// Set when the replica's hash matches nothing in the identifier's history.
    #[serde(default)]
    pub unverified_provenance: bool,
}

fn default_role() -> String {
    DEFAULT_REPLICA_ROLE.to_string()
}

impl ManifestRecord {
    pub fn new(
        logical_id: VaultUri,
        replica_path: impl Into<String>,
        content_hash: ContentHash,
        size: u64,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            logical_id,
            replica_path: replica_path.into(),
            replica_role: default_role(),
            content_hash,
            size,
            created_at: Utc::now(),
            superseded_by: None,
            supersedes: Vec::new(),
            unverified_provenance: false,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.replica_role = role.into();
        self
    }

    /// Inert records are skipped by resolution but kept for audit.
    pub fn is_current(&self) -> bool {
        self.superseded_by.is_none()
    }
}
