//! Pointers, ranges, and the tagged outcome of resolving them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashing::ContentHash;
use crate::models::VaultUri;

/// A slice of replica content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerRange {
    /// Half-open byte range `[start, end)`.
    Bytes { start: u64, end: u64 },
    /// 1-indexed inclusive line range.
    Lines { start: u64, end: u64 },
}

/// A citation of evidence: which content, which part of it, and optionally
/// which digest the citing MU recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pointer {
    pub logical_id: VaultUri,
    #[serde(default)]
    pub range: Option<PointerRange>,
    #[serde(default)]
    pub expected_hash: Option<ContentHash>,
}

impl Pointer {
    pub fn new(logical_id: VaultUri) -> Self {
        Self {
            logical_id,
            range: None,
            expected_hash: None,
        }
    }

    pub fn with_range(mut self, range: PointerRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_expected_hash(mut self, hash: ContentHash) -> Self {
        self.expected_hash = Some(hash);
        self
    }
}

/// Result of resolving a logical identifier. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved {
        /// The requested slice (whole replica when no range was given).
        #[serde(skip, default)]
        bytes: Vec<u8>,
        verified_hash: ContentHash,
        replica_path: String,
        record_id: Uuid,
        #[serde(default)]
        unverified_provenance: bool,
    },
    /// No current manifest record for the identifier.
    NotFound,
    /// Replica present but its content is not what the manifest says.
    HashMismatch {
        expected: ContentHash,
        actual: ContentHash,
        replica_path: String,
    },
    /// Replica absent, unreadable, or its vault root is not mounted.
    ReplicaMissing { replica_path: String },
    /// Replica verified but the requested range lies outside it.
    RangeOutOfBounds { range: PointerRange, size: u64 },
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Ranking used to pick the most specific failure across candidates.
    /// A mismatch is actionable evidence of corruption; absence may only
    /// mean an unmounted root.
    pub fn specificity(&self) -> u8 {
        match self {
            Self::Resolved { .. } => 4,
            Self::HashMismatch { .. } => 3,
            Self::RangeOutOfBounds { .. } => 2,
            Self::ReplicaMissing { .. } => 1,
            Self::NotFound => 0,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Resolved { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolved { .. } => "resolved",
            Self::NotFound => "not_found",
            Self::HashMismatch { .. } => "hash_mismatch",
            Self::ReplicaMissing { .. } => "replica_missing",
            Self::RangeOutOfBounds { .. } => "range_out_of_bounds",
        }
    }
}
