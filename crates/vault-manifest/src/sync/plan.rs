use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vault_core::errors::{ManifestError, VaultResult};
use vault_core::hashing::ContentHash;
use vault_core::models::{ManifestRecord, VaultKind, VaultUri};
use vault_core::traits::IManifestStore;

use crate::ledger;
use crate::store::ManifestStore;

/// One reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchAction {
    /// New to the base ledger; safe to append.
    AppendRecord { record: ManifestRecord },
    /// Already present with the same content.
    SkipDuplicate {
        logical_id: VaultUri,
        replica_path: String,
        content_hash: ContentHash,
    },
    /// Same identifier and replica path, different content.
    BlockedConflict {
        logical_id: VaultUri,
        replica_path: String,
        base_hash: ContentHash,
        incoming_hash: ContentHash,
    },
    /// Role already filled at another path in the base ledger.
    BlockedRoleOccupied {
        logical_id: VaultUri,
        role: String,
        base_path: String,
        incoming_path: String,
    },
    /// Same content already known under another identifier.
    SuggestUriAlias {
        logical_id: VaultUri,
        alias_of: VaultUri,
        content_hash: ContentHash,
    },
}

impl PatchAction {
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::BlockedConflict { .. } | Self::BlockedRoleOccupied { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPlan {
    pub kind: VaultKind,
    pub incoming_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub actions: Vec<PatchAction>,
    pub blocked: bool,
}

impl PatchPlan {
    pub fn appends(&self) -> impl Iterator<Item = &ManifestRecord> {
        self.actions.iter().filter_map(|a| match a {
            PatchAction::AppendRecord { record } => Some(record),
            _ => None,
        })
    }

    pub fn conflict_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_blocking()).count()
    }
}

/// Compare an incoming manifest file against the base store.
///
/// Only records that are current within the incoming file are considered;
/// its superseded history stays with it.
pub fn plan_patch(
    store: &ManifestStore,
    kind: VaultKind,
    incoming_path: &Path,
) -> VaultResult<PatchPlan> {
    let parsed = ledger::read_ledger(incoming_path)?;
    if parsed.torn_at.is_some() {
        warn!(
            path = %incoming_path.display(),
            dropped_bytes = parsed.torn_bytes,
            "ignoring torn tail of incoming manifest"
        );
    }

    let replaced: std::collections::HashSet<_> = parsed
        .records
        .iter()
        .flat_map(|r| r.supersedes.iter().copied())
        .collect();

    let mut actions = Vec::new();
    // (logical_id, replica_path) -> hash, for records already planned.
    let mut planned: HashMap<(VaultUri, String), ContentHash> = HashMap::new();

    for record in parsed
        .records
        .into_iter()
        .filter(|r| !replaced.contains(&r.record_id))
    {
        let key = (record.logical_id.clone(), record.replica_path.clone());

        if store.get(&record.record_id).is_some() {
            actions.push(skip(&record));
            continue;
        }
        if let Some(hash) = planned.get(&key) {
            actions.push(if *hash == record.content_hash {
                skip(&record)
            } else {
                PatchAction::BlockedConflict {
                    logical_id: record.logical_id.clone(),
                    replica_path: record.replica_path.clone(),
                    base_hash: hash.clone(),
                    incoming_hash: record.content_hash.clone(),
                }
            });
            continue;
        }

        let base = store.lookup(&record.logical_id)?;
        if let Some(same_path) = base.iter().find(|b| b.replica_path == record.replica_path) {
            actions.push(if same_path.content_hash == record.content_hash {
                skip(&record)
            } else {
                PatchAction::BlockedConflict {
                    logical_id: record.logical_id.clone(),
                    replica_path: record.replica_path.clone(),
                    base_hash: same_path.content_hash.clone(),
                    incoming_hash: record.content_hash.clone(),
                }
            });
            continue;
        }
        if let Some(occupant) = base.iter().find(|b| b.replica_role == record.replica_role) {
            actions.push(PatchAction::BlockedRoleOccupied {
                logical_id: record.logical_id.clone(),
                role: record.replica_role.clone(),
                base_path: occupant.replica_path.clone(),
                incoming_path: record.replica_path.clone(),
            });
            continue;
        }

        if let Some(alias) = store
            .find_by_hash(&record.content_hash)?
            .into_iter()
            .find(|b| b.logical_id != record.logical_id)
        {
            actions.push(PatchAction::SuggestUriAlias {
                logical_id: record.logical_id.clone(),
                alias_of: alias.logical_id,
                content_hash: record.content_hash.clone(),
            });
        }

        let mut fresh = record;
        fresh.supersedes.clear();
        fresh.superseded_by = None;
        planned.insert(key, fresh.content_hash.clone());
        actions.push(PatchAction::AppendRecord { record: fresh });
    }

    let blocked = actions.iter().any(PatchAction::is_blocking);
    let plan = PatchPlan {
        kind,
        incoming_path: incoming_path.to_path_buf(),
        created_at: Utc::now(),
        actions,
        blocked,
    };
    info!(
        kind = %kind,
        incoming = %incoming_path.display(),
        appends = plan.appends().count(),
        conflicts = plan.conflict_count(),
        "manifest patch planned"
    );
    Ok(plan)
}

fn skip(record: &ManifestRecord) -> PatchAction {
    PatchAction::SkipDuplicate {
        logical_id: record.logical_id.clone(),
        replica_path: record.replica_path.clone(),
        content_hash: record.content_hash.clone(),
    }
}

/// Perform the plan's safe appends. A blocked plan is refused unless
/// `force` is set; conflicting records are never written either way.
pub fn apply_plan(
    store: &ManifestStore,
    plan: &PatchPlan,
    force: bool,
) -> VaultResult<Vec<ManifestRecord>> {
    if plan.blocked && !force {
        return Err(ManifestError::PlanBlocked {
            kind: plan.kind.to_string(),
            conflicts: plan.conflict_count(),
        }
        .into());
    }

    let mut landed = Vec::new();
    for record in plan.appends() {
        landed.push(store.append(plan.kind, record.clone())?);
    }
    info!(kind = %plan.kind, landed = landed.len(), forced = force, "manifest patch applied");
    Ok(landed)
}
