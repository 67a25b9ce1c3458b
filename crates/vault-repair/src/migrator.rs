//! Pointer Migrator: lands a corrected replica as a superseding record.
//! Only ever adds manifest metadata; no replica bytes are touched.

use std::sync::Arc;

use vault_core::constants::DEFAULT_REPLICA_ROLE;
use vault_core::errors::{RepairError, VaultResult};
use vault_core::hashing;
use vault_core::models::{CandidateSource, ManifestRecord, ProposedRepair, VaultUri};
use vault_core::traits::{IManifestStore, SupersedeTarget};
use vault_observability::migrate_span;
use vault_observability::tracing_setup::events;
use vault_resolver::ReplicaLocator;

pub struct PointerMigrator {
    store: Arc<dyn IManifestStore>,
    locator: ReplicaLocator,
}

impl PointerMigrator {
    pub fn new(store: Arc<dyn IManifestStore>, locator: ReplicaLocator) -> Self {
        Self { store, locator }
    }

    /// Compute the record a migration would write, without writing it.
    pub fn preview(
        &self,
        logical_id: &VaultUri,
        replica_path: &str,
        source: CandidateSource,
    ) -> VaultResult<ProposedRepair> {
        let (content_hash, size) = self.hash_replica(logical_id, replica_path)?;
        let history = self.store.history(logical_id)?;
        let unverified_provenance = !history.iter().any(|r| r.content_hash == content_hash);
        let supersedes = history
            .iter()
            .filter(|r| r.is_current())
            .map(|r| r.record_id)
            .collect();

        Ok(ProposedRepair {
            subject: logical_id.clone(),
            replica_path: replica_path.to_string(),
            content_hash,
            size,
            source,
            supersedes,
            unverified_provenance,
        })
    }

    /// Write a previewed migration, re-checking the replica first.
    pub fn commit(&self, proposal: &ProposedRepair) -> VaultResult<ManifestRecord> {
        let span = migrate_span!(proposal.subject);
        let _enter = span.enter();

        let (content_hash, size) = self.hash_replica(&proposal.subject, &proposal.replica_path)?;
        if content_hash != proposal.content_hash {
            return Err(RepairError::ProposalStale {
                path: proposal.replica_path.clone(),
                expected: proposal.content_hash.to_string(),
            }
            .into());
        }

        let role = self
            .store
            .lookup(&proposal.subject)?
            .first()
            .map(|r| r.replica_role.clone())
            .unwrap_or_else(|| DEFAULT_REPLICA_ROLE.to_string());
        let mut record = ManifestRecord::new(
            proposal.subject.clone(),
            proposal.replica_path.clone(),
            content_hash,
            size,
        )
        .with_role(role);
        record.unverified_provenance = proposal.unverified_provenance;

        let landed = self
            .store
            .supersede(SupersedeTarget::Logical(proposal.subject.clone()), record)?;
        events::migration_landed(
            &landed.logical_id.to_string(),
            &landed.record_id.to_string(),
            landed.unverified_provenance,
        );
        Ok(landed)
    }

    /// `preview` then `commit`.
    pub fn migrate(&self, old_logical_id: &VaultUri, new_replica_path: &str) -> VaultResult<ManifestRecord> {
        let proposal = self.preview(old_logical_id, new_replica_path, CandidateSource::Explicit)?;
        self.commit(&proposal)
    }

    fn hash_replica(
        &self,
        logical_id: &VaultUri,
        replica_path: &str,
    ) -> VaultResult<(hashing::ContentHash, u64)> {
        let path = self
            .locator
            .locate(logical_id, replica_path)
            .ok_or_else(|| RepairError::ReplicaUnreadable {
                path: replica_path.to_string(),
                reason: format!("vault {} is not mounted", logical_id.vault_id()),
            })?;
        hashing::hash_file(&path).map_err(|e| {
            RepairError::ReplicaUnreadable {
                path: replica_path.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
