use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vault_core::models::{ResolutionOutcome, VaultKind, VaultUri};

/// One current record whose replica failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyFailure {
    pub record_id: Uuid,
    pub logical_id: VaultUri,
    pub outcome: ResolutionOutcome,
}

/// Result of re-verifying every current record of one manifest kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub kind: VaultKind,
    pub checked: usize,
    pub verified: usize,
    pub failures: Vec<VerifyFailure>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
