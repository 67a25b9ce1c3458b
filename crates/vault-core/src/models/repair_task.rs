use serde::{Deserialize, Serialize};

use crate::hashing::ContentHash;
use crate::models::{DegradationReason, VaultUri};

/// The only remediation type emitted today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairTaskType {
    RepairPointer,
}

/// What the executor should look for when rescanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicaHint {
    /// Last known-good digest of the subject's content.
    #[serde(default)]
    pub content_hash: Option<ContentHash>,
    /// Replica that failed. The rescan searches its directory first.
    #[serde(default)]
    pub replica_path: Option<String>,
}

/// A typed, idempotent remediation request. Pure data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairTask {
    #[serde(rename = "type")]
    pub task_type: RepairTaskType,
    pub task_id: String,
    pub idempotency_key: String,
    pub subject_logical_id: VaultUri,
    pub reason: DegradationReason,
    #[serde(default)]
    pub proposed_action: Option<ReplicaHint>,
}
