//! `ManifestStore`: the [`IManifestStore`] implementation over JSONL files.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use vault_core::config::{ManifestConfig, VaultConfig};
use vault_core::constants::MANIFEST_FILE_SUFFIX;
use vault_core::errors::{ManifestError, VaultError, VaultResult};
use vault_core::hashing::ContentHash;
use vault_core::models::{ManifestRecord, VaultKind, VaultUri};
use vault_core::traits::{IManifestStore, SupersedeTarget};

use crate::ledger::{self, FileSink, LineSink};
use crate::locks::KeyedLocks;
use crate::state::{Entry, LedgerState};

/// Append-only manifest ledger, one `<kind>_manifest.jsonl` per kind.
pub struct ManifestStore {
    dir: PathBuf,
    config: ManifestConfig,
    sink: Box<dyn LineSink>,
    state: RwLock<LedgerState>,
    /// Serializes mutations per logical identifier.
    identifiers: KeyedLocks,
    /// Serializes byte writes per manifest file.
    files: KeyedLocks,
    /// End of the last whole line in each manifest file.
    committed: DashMap<VaultKind, u64>,
}

impl ManifestStore {
    /// Open (or create) the ledger under `dir`, recovering torn tails.
    pub fn open(dir: impl Into<PathBuf>, config: ManifestConfig) -> VaultResult<Self> {
        Self::open_with_sink(dir, config, Box::new(FileSink))
    }

    /// Open using the manifests directory derived from a full config.
    pub fn from_config(config: &VaultConfig) -> VaultResult<Self> {
        Self::open(config.manifests_dir()?, config.manifest.clone())
    }

    /// Open with a custom sink (fault injection in tests).
    pub fn open_with_sink(
        dir: impl Into<PathBuf>,
        config: ManifestConfig,
        sink: Box<dyn LineSink>,
    ) -> VaultResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| VaultError::io(&dir, e))?;

        let mut state = LedgerState::default();
        let committed = DashMap::new();
        for kind in VaultKind::ALL {
            let path = kind_path(&dir, kind);
            let parsed = ledger::read_ledger(&path)?;
            if let Some(valid_len) = parsed.torn_at {
                warn!(
                    path = %path.display(),
                    dropped_bytes = parsed.torn_bytes,
                    "truncating torn manifest tail"
                );
                sink.truncate(&path, valid_len)
                    .map_err(|e| VaultError::io(&path, e))?;
            }
            let len = sink.len(&path).map_err(|e| VaultError::io(&path, e))?;
            committed.insert(kind, len);
            for record in parsed.records {
                state.push(kind, record);
            }
        }
        state.link_all();
        info!(
            dir = %dir.display(),
            records = state.len(),
            current = state.current_count(),
            "manifest store opened"
        );

        Ok(Self {
            dir,
            config,
            sink,
            state: RwLock::new(state),
            identifiers: KeyedLocks::new(),
            files: KeyedLocks::new(),
            committed,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the manifest file for `kind`.
    pub fn kind_path(&self, kind: VaultKind) -> PathBuf {
        kind_path(&self.dir, kind)
    }

    /// Number of non-superseded records across all kinds.
    pub fn current_count(&self) -> usize {
        self.read().current_count()
    }

    /// Record by id, current or not.
    pub fn get(&self, record_id: &Uuid) -> Option<ManifestRecord> {
        self.read().get(record_id).map(|e| e.record.clone())
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn append_locked(&self, kind: VaultKind, record: ManifestRecord) -> VaultResult<ManifestRecord> {
        {
            let state = self.read();
            check_placement(&state, &record.logical_id, kind)?;
            let live = state.current(&record.logical_id);
            if let Some(existing) = check_live_replicas(live.into_iter(), &record)? {
                debug!(
                    logical_id = %record.logical_id,
                    record_id = %existing.record_id,
                    "append is a repeat of a current record"
                );
                return Ok(existing);
            }
        }

        self.commit(kind, &record)?;
        info!(
            logical_id = %record.logical_id,
            record_id = %record.record_id,
            kind = %kind,
            hash = %record.content_hash,
            "manifest record appended"
        );
        Ok(record)
    }

    fn supersede_locked(
        &self,
        target: &SupersedeTarget,
        new_record: ManifestRecord,
    ) -> VaultResult<ManifestRecord> {
        let (kind, record) = {
            let state = self.read();
            let targets: Vec<&Entry> = match target {
                SupersedeTarget::Logical(uri) => state.current(uri),
                SupersedeTarget::Record(id) => {
                    let entry = state.get(id).ok_or_else(|| ManifestError::RecordNotFound {
                        record_id: id.to_string(),
                    })?;
                    if !entry.record.is_current() {
                        return Err(ManifestError::SupersessionInvariant {
                            details: format!("record {id} is already superseded"),
                        }
                        .into());
                    }
                    vec![entry]
                }
            };

            let kind = targets
                .first()
                .map(|e| e.kind)
                .or_else(|| state.placement(&new_record.logical_id))
                .unwrap_or_else(|| new_record.logical_id.kind());
            check_placement(&state, &new_record.logical_id, kind)?;

            let replaced: Vec<Uuid> = targets.iter().map(|e| e.record.record_id).collect();
            let survivors = state
                .current(&new_record.logical_id)
                .into_iter()
                .filter(|e| !replaced.contains(&e.record.record_id));
            if let Some(existing) = check_live_replicas(survivors, &new_record)? {
                return Err(ManifestError::SupersessionInvariant {
                    details: format!(
                        "{} is already current at {} as record {}",
                        new_record.logical_id, existing.replica_path, existing.record_id
                    ),
                }
                .into());
            }

            let mut record = new_record;
            for id in replaced {
                if !record.supersedes.contains(&id) {
                    record.supersedes.push(id);
                }
            }
            (kind, record)
        };

        self.commit(kind, &record)?;
        info!(
            logical_id = %record.logical_id,
            record_id = %record.record_id,
            replaced = record.supersedes.len(),
            replica = %record.replica_path,
            "manifest record superseded"
        );
        Ok(record)
    }

    /// Persist one line, then publish it to readers. Publishing happens
    /// under the file lock so in-memory order matches line order.
    fn commit(&self, kind: VaultKind, record: &ManifestRecord) -> VaultResult<()> {
        let line = ledger::encode_line(record)?;
        let path = self.kind_path(kind);
        self.files.with_locked(&[kind.as_str()], || -> VaultResult<()> {
            let committed = self.committed.get(&kind).map_or(0, |len| *len);
            let len = ledger::append_line(
                self.sink.as_ref(),
                &path,
                committed,
                &line,
                self.config.write_retries,
                self.config.retry_backoff_ms,
            )?;
            self.committed.insert(kind, len);
            self.write().insert(kind, record.clone());
            Ok(())
        })
    }
}

fn kind_path(dir: &Path, kind: VaultKind) -> PathBuf {
    dir.join(format!("{kind}{MANIFEST_FILE_SUFFIX}"))
}

/// An identifier's records all live in one manifest file so that append
/// order survives a reload.
fn check_placement(state: &LedgerState, logical_id: &VaultUri, kind: VaultKind) -> VaultResult<()> {
    match state.placement(logical_id) {
        Some(existing) if existing != kind => Err(ManifestError::KindMismatch {
            logical_id: logical_id.to_string(),
            kind: kind.to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}

/// Conflicts between `incoming` and the live records it would sit beside.
/// Returns an existing record when `incoming` is an exact repeat.
fn check_live_replicas<'a>(
    live: impl Iterator<Item = &'a Entry>,
    incoming: &ManifestRecord,
) -> VaultResult<Option<ManifestRecord>> {
    for entry in live {
        let current = &entry.record;
        if current.replica_path == incoming.replica_path {
            if current.content_hash == incoming.content_hash {
                return Ok(Some(current.clone()));
            }
            return Err(ManifestError::DuplicateReplicaConflict {
                logical_id: incoming.logical_id.to_string(),
                replica_path: incoming.replica_path.clone(),
                existing: current.content_hash.to_string(),
                incoming: incoming.content_hash.to_string(),
            }
            .into());
        }
        if current.replica_role == incoming.replica_role {
            return Err(ManifestError::ReplicaRoleOccupied {
                logical_id: incoming.logical_id.to_string(),
                role: incoming.replica_role.clone(),
                current_path: current.replica_path.clone(),
            }
            .into());
        }
    }
    Ok(None)
}

impl IManifestStore for ManifestStore {
    fn append(&self, kind: VaultKind, record: ManifestRecord) -> VaultResult<ManifestRecord> {
        if !record.supersedes.is_empty() || record.superseded_by.is_some() {
            return Err(ManifestError::SupersessionInvariant {
                details: format!(
                    "append of {} carries supersession links; use supersede",
                    record.record_id
                ),
            }
            .into());
        }

        let key = record.logical_id.to_string();
        self.identifiers
            .with_locked(&[key.as_str()], || self.append_locked(kind, record))
    }

    fn lookup(&self, logical_id: &VaultUri) -> VaultResult<Vec<ManifestRecord>> {
        Ok(self
            .read()
            .current(logical_id)
            .into_iter()
            .map(|e| e.record.clone())
            .collect())
    }

    fn supersede(
        &self,
        target: SupersedeTarget,
        new_record: ManifestRecord,
    ) -> VaultResult<ManifestRecord> {
        if new_record.superseded_by.is_some() {
            return Err(ManifestError::SupersessionInvariant {
                details: format!("new record {} is already superseded", new_record.record_id),
            }
            .into());
        }

        let target_key = match &target {
            SupersedeTarget::Logical(uri) => uri.to_string(),
            SupersedeTarget::Record(id) => self
                .read()
                .get(id)
                .map(|e| e.record.logical_id.to_string())
                .ok_or_else(|| ManifestError::RecordNotFound {
                    record_id: id.to_string(),
                })?,
        };
        let new_key = new_record.logical_id.to_string();
        self.identifiers
            .with_locked(&[target_key.as_str(), new_key.as_str()], || {
                self.supersede_locked(&target, new_record)
            })
    }

    fn history(&self, logical_id: &VaultUri) -> VaultResult<Vec<ManifestRecord>> {
        Ok(self.read().history(logical_id))
    }

    fn records(&self, kind: VaultKind) -> VaultResult<Vec<ManifestRecord>> {
        Ok(self.read().records_of_kind(kind))
    }

    fn find_by_hash(&self, hash: &ContentHash) -> VaultResult<Vec<ManifestRecord>> {
        Ok(self.read().find_by_hash(hash))
    }
}
