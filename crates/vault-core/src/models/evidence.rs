use serde::{Deserialize, Serialize};

use crate::hashing::ContentHash;
use crate::models::{PointerRange, RepairTask, ResolutionOutcome, VaultUri};

/// Why a citation could not be trusted at bundle-build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DegradationReason {
    NotFound,
    HashMismatch {
        expected: ContentHash,
        actual: ContentHash,
    },
    ReplicaMissing {
        replica_path: String,
    },
    RangeOutOfBounds {
        size: u64,
    },
}

impl DegradationReason {
    /// `None` for a resolved outcome.
    pub fn from_outcome(outcome: &ResolutionOutcome) -> Option<Self> {
        match outcome {
            ResolutionOutcome::Resolved { .. } => None,
            ResolutionOutcome::NotFound => Some(Self::NotFound),
            ResolutionOutcome::HashMismatch {
                expected, actual, ..
            } => Some(Self::HashMismatch {
                expected: expected.clone(),
                actual: actual.clone(),
            }),
            ResolutionOutcome::ReplicaMissing { replica_path } => Some(Self::ReplicaMissing {
                replica_path: replica_path.clone(),
            }),
            ResolutionOutcome::RangeOutOfBounds { size, .. } => {
                Some(Self::RangeOutOfBounds { size: *size })
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::HashMismatch { .. } => "hash_mismatch",
            Self::ReplicaMissing { .. } => "replica_missing",
            Self::RangeOutOfBounds { .. } => "range_out_of_bounds",
        }
    }
}

/// One cited piece of evidence inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceReference {
    pub logical_id: VaultUri,
    #[serde(default)]
    pub range: Option<PointerRange>,
    pub outcome: ResolutionOutcome,
    /// True iff `outcome` is not `Resolved`.
    pub degraded: bool,
    /// Redacted excerpt, present only when depth policy asks for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A candidate repair derived from one failing identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReason {
    pub logical_id: VaultUri,
    pub reason: DegradationReason,
    /// Digest the citation or manifest last vouched for, if any.
    #[serde(default)]
    pub last_known_hash: Option<ContentHash>,
}

/// Diagnostics a bundle exposes outward to exporters and evaluators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDiagnostics {
    pub evidence_degraded: bool,
    #[serde(default)]
    pub repair_reasons: Vec<RepairReason>,
    #[serde(default)]
    pub repair_tasks: Vec<RepairTask>,
}
