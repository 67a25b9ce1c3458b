//! Error taxonomy. Subsystem enums fold into [`VaultError`]; [`ErrorClass`]
//! maps any error onto the five failure classes operators reason about.

mod config_error;
mod journal_error;
mod manifest_error;
mod repair_error;

pub use config_error::ConfigError;
pub use journal_error::JournalError;
pub use manifest_error::ManifestError;
pub use repair_error::RepairError;

use serde::{Deserialize, Serialize};

pub type VaultResult<T> = Result<T, VaultError>;

/// Top-level error for every fallible vault operation.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("manifest error: {0}")]
    ManifestError(#[from] ManifestError),

    #[error("journal error: {0}")]
    JournalError(#[from] JournalError),

    #[error("repair error: {0}")]
    RepairError(#[from] RepairError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("invalid vault uri {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("integrity error for {logical_id}: expected {expected}, actual {actual}")]
    IntegrityError {
        logical_id: String,
        expected: String,
        actual: String,
    },

    #[error("unverified provenance for {logical_id}: replica {replica_path} matches no prior hash")]
    UnverifiedProvenance {
        logical_id: String,
        replica_path: String,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl VaultError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Which failure class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::IntegrityError { .. } => ErrorClass::Integrity,
            Self::ManifestError(ManifestError::DuplicateReplicaConflict { .. }) => {
                ErrorClass::Integrity
            }
            Self::ManifestError(ManifestError::Corrupt { .. }) => ErrorClass::Integrity,
            Self::ManifestError(ManifestError::WriteFailed { .. })
            | Self::ManifestError(ManifestError::SupersessionInvariant { .. }) => {
                ErrorClass::Write
            }
            Self::ManifestError(_) => ErrorClass::Invalid,
            Self::RepairError(RepairError::NoCandidateReplica { .. }) => {
                ErrorClass::NoCandidateReplica
            }
            Self::RepairError(RepairError::ReplicaUnreadable { .. }) => ErrorClass::Availability,
            Self::RepairError(RepairError::ProposalStale { .. }) => ErrorClass::Integrity,
            Self::RepairError(_) => ErrorClass::Invalid,
            Self::UnverifiedProvenance { .. } => ErrorClass::UnverifiedProvenance,
            Self::Io { .. } => ErrorClass::Availability,
            Self::JournalError(_) => ErrorClass::Write,
            Self::ConfigError(_) | Self::InvalidUri { .. } | Self::SerializationError(_) => {
                ErrorClass::Invalid
            }
        }
    }
}

/// Operator-facing failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Data present but wrong (hash mismatch).
    Integrity,
    /// Data absent, possibly recoverable (replica missing or unmounted).
    Availability,
    /// Manifest or journal write failed; never partially applied.
    Write,
    /// Repair found nothing to point at; potential real data loss.
    NoCandidateReplica,
    /// A repair landed but cannot be chained to prior verified history.
    UnverifiedProvenance,
    /// Malformed input or misuse of an API.
    Invalid,
}
