use std::sync::Arc;

use tracing::{debug, info};

use vault_core::config::{ResolverConfig, VaultConfig};
use vault_core::errors::VaultResult;
use vault_core::hashing::{self, ContentHash};
use vault_core::models::{ManifestRecord, PointerRange, ResolutionOutcome, VaultKind, VaultUri};
use vault_core::traits::{IManifestStore, IPointerResolver};
use vault_observability::resolve_span;

use crate::locator::ReplicaLocator;
use crate::range;
use crate::reader::{self, ReadError};
use crate::report::{VerifyFailure, VerifyReport};

/// Resolves logical identifiers against the manifest store and the
/// filesystem. Holds no cache: every call revalidates.
pub struct PointerResolver {
    store: Arc<dyn IManifestStore>,
    locator: ReplicaLocator,
    config: ResolverConfig,
}

impl PointerResolver {
    pub fn new(store: Arc<dyn IManifestStore>, locator: ReplicaLocator, config: ResolverConfig) -> Self {
        Self {
            store,
            locator,
            config,
        }
    }

    pub fn from_config(store: Arc<dyn IManifestStore>, config: &VaultConfig) -> Self {
        Self::new(
            store,
            ReplicaLocator::from_config(config),
            config.resolver.clone(),
        )
    }

    pub fn locator(&self) -> &ReplicaLocator {
        &self.locator
    }

    pub fn store(&self) -> &Arc<dyn IManifestStore> {
        &self.store
    }

    /// Read, verify, and slice one candidate record.
    pub fn check_record(
        &self,
        record: &ManifestRecord,
        range: Option<PointerRange>,
    ) -> ResolutionOutcome {
        let missing = || ResolutionOutcome::ReplicaMissing {
            replica_path: record.replica_path.clone(),
        };
        let Some(path) = self.locator.locate(&record.logical_id, &record.replica_path) else {
            debug!(logical_id = %record.logical_id, vault = record.logical_id.vault_id(), "vault root not mounted");
            return missing();
        };

        let bytes = match reader::read_bounded(&path, &self.config) {
            Ok(bytes) => bytes,
            Err(ReadError::Missing) => return missing(),
            Err(e) => {
                debug!(path = %path.display(), error = ?e, "replica unreadable");
                return missing();
            }
        };

        let actual = hashing::hash(&bytes);
        if actual != record.content_hash {
            return ResolutionOutcome::HashMismatch {
                expected: record.content_hash.clone(),
                actual,
                replica_path: record.replica_path.clone(),
            };
        }

        let bytes = match range {
            None => bytes,
            Some(r) => match range::slice(&bytes, r) {
                Some(slice) => slice.to_vec(),
                None => {
                    return ResolutionOutcome::RangeOutOfBounds {
                        range: r,
                        size: bytes.len() as u64,
                    }
                }
            },
        };

        ResolutionOutcome::Resolved {
            bytes,
            verified_hash: actual,
            replica_path: record.replica_path.clone(),
            record_id: record.record_id,
            unverified_provenance: record.unverified_provenance,
        }
    }

    /// First candidate that resolves, else the most specific failure
    /// (earliest candidate wins ties).
    fn first_resolved(
        &self,
        candidates: &[ManifestRecord],
        range: Option<PointerRange>,
    ) -> ResolutionOutcome {
        let mut best = ResolutionOutcome::NotFound;
        for record in candidates {
            let outcome = self.check_record(record, range);
            if outcome.is_resolved() {
                return outcome;
            }
            debug!(
                logical_id = %record.logical_id,
                replica = %record.replica_path,
                outcome = outcome.label(),
                "candidate rejected"
            );
            if outcome.specificity() > best.specificity() {
                best = outcome;
            }
        }
        best
    }

    /// Resolve content by digest alone, through the manifest hash index.
    /// Used for citations whose identifier no longer exists.
    pub fn resolve_by_hash(
        &self,
        hash: &ContentHash,
        range: Option<PointerRange>,
    ) -> ResolutionOutcome {
        match self.store.find_by_hash(hash) {
            Ok(candidates) => self.first_resolved(&candidates, range),
            Err(e) => {
                debug!(hash = %hash, error = %e, "hash index lookup failed");
                ResolutionOutcome::NotFound
            }
        }
    }

    /// Re-verify every current record of one manifest kind.
    pub fn verify_manifest(&self, kind: VaultKind) -> VaultResult<VerifyReport> {
        let records: Vec<ManifestRecord> = self
            .store
            .records(kind)?
            .into_iter()
            .filter(ManifestRecord::is_current)
            .collect();

        let mut failures = Vec::new();
        for record in &records {
            let outcome = self.check_record(record, None);
            if !outcome.is_resolved() {
                failures.push(VerifyFailure {
                    record_id: record.record_id,
                    logical_id: record.logical_id.clone(),
                    outcome,
                });
            }
        }

        let report = VerifyReport {
            kind,
            checked: records.len(),
            verified: records.len() - failures.len(),
            failures,
        };
        info!(
            kind = %kind,
            checked = report.checked,
            failed = report.failures.len(),
            "manifest verified"
        );
        Ok(report)
    }
}

impl IPointerResolver for PointerResolver {
    fn resolve(&self, logical_id: &VaultUri, range: Option<PointerRange>) -> ResolutionOutcome {
        let span = resolve_span!(logical_id);
        let _enter = span.enter();

        let candidates = match self.store.lookup(logical_id) {
            Ok(candidates) => candidates,
            Err(e) => {
                debug!(logical_id = %logical_id, error = %e, "manifest lookup failed");
                return ResolutionOutcome::NotFound;
            }
        };
        let outcome = self.first_resolved(&candidates, range);
        debug!(
            logical_id = %logical_id,
            candidates = candidates.len(),
            outcome = outcome.label(),
            "resolved"
        );
        outcome
    }
}
