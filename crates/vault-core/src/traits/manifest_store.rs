use uuid::Uuid;

use crate::errors::VaultResult;
use crate::hashing::ContentHash;
use crate::models::{ManifestRecord, VaultKind, VaultUri};

/// What a supersession replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupersedeTarget {
    /// Every current record of the identifier.
    Logical(VaultUri),
    /// One specific record.
    Record(Uuid),
}

/// Append-only manifest ledger.
pub trait IManifestStore: Send + Sync {
    /// Add a record to the `kind` manifest.
    fn append(&self, kind: VaultKind, record: ManifestRecord) -> VaultResult<ManifestRecord>;

    /// Current records, most recently appended first.
    fn lookup(&self, logical_id: &VaultUri) -> VaultResult<Vec<ManifestRecord>>;

    /// Append `new_record` and mark the target's current records inert, atomically.
    fn supersede(
        &self,
        target: SupersedeTarget,
        new_record: ManifestRecord,
    ) -> VaultResult<ManifestRecord>;

    /// Every record ever appended for the identifier, in append order.
    fn history(&self, logical_id: &VaultUri) -> VaultResult<Vec<ManifestRecord>>;

    /// Every record of one kind, in append order.
    fn records(&self, kind: VaultKind) -> VaultResult<Vec<ManifestRecord>>;

    /// Current records across all kinds holding this digest.
    fn find_by_hash(&self, hash: &ContentHash) -> VaultResult<Vec<ManifestRecord>>;
}
