/// Manifest ledger errors.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("duplicate replica conflict for {logical_id} at {replica_path}: current hash {existing}, incoming {incoming}")]
    DuplicateReplicaConflict {
        logical_id: String,
        replica_path: String,
        existing: String,
        incoming: String,
    },

    #[error("replica role {role} of {logical_id} is already current at {current_path}; supersede it instead")]
    ReplicaRoleOccupied {
        logical_id: String,
        role: String,
        current_path: String,
    },

    #[error("record for {logical_id} does not belong in the {kind} manifest")]
    KindMismatch { logical_id: String, kind: String },

    #[error("manifest write failed after {attempts} attempts: {reason}")]
    WriteFailed { attempts: u32, reason: String },

    #[error("manifest {path} corrupt at line {line}: {reason}")]
    Corrupt {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("manifest record not found: {record_id}")]
    RecordNotFound { record_id: String },

    #[error("supersession invariant violated: {details}")]
    SupersessionInvariant { details: String },

    #[error("patch plan for {kind} manifest is blocked by {conflicts} conflict(s)")]
    PlanBlocked { kind: String, conflicts: usize },
}
