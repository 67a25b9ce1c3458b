//! Repair Task Emitter: diagnostics in, repair tasks out. Pure.

use std::collections::HashSet;

use vault_core::hashing::{self, ContentHash};
use vault_core::models::{
    BundleDiagnostics, DegradationReason, RepairTask, RepairTaskType, ReplicaHint, VaultUri,
};
use vault_observability::tracing_setup::events;

const TASK_TYPE: &str = "REPAIR_POINTER";

/// Stable key over everything that makes two repair requests the same.
pub fn idempotency_key(
    subject: &VaultUri,
    reason: &DegradationReason,
    last_known_hash: Option<&ContentHash>,
) -> String {
    let subject = subject.to_string();
    let hash = last_known_hash.map(ContentHash::as_str).unwrap_or("");
    hashing::key_of(&[TASK_TYPE, &subject, hash, reason.code()])
        .hex()
        .to_string()
}

/// One task per distinct degraded identifier, in first-seen order.
/// Emitting twice from equal diagnostics yields equal tasks.
pub fn emit(diagnostics: &BundleDiagnostics) -> Vec<RepairTask> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for reason in &diagnostics.repair_reasons {
        if !seen.insert(&reason.logical_id) {
            continue;
        }
        let key = idempotency_key(
            &reason.logical_id,
            &reason.reason,
            reason.last_known_hash.as_ref(),
        );
        let replica_path = match &reason.reason {
            DegradationReason::ReplicaMissing { replica_path } => Some(replica_path.clone()),
            _ => None,
        };
        let proposed_action = match (&reason.last_known_hash, &replica_path) {
            (None, None) => None,
            _ => Some(ReplicaHint {
                content_hash: reason.last_known_hash.clone(),
                replica_path,
            }),
        };

        let task = RepairTask {
            task_type: RepairTaskType::RepairPointer,
            task_id: format!("repair-{}", &key[..16]),
            idempotency_key: key,
            subject_logical_id: reason.logical_id.clone(),
            reason: reason.reason.clone(),
            proposed_action,
        };
        events::repair_emitted(
            &task.task_id,
            &reason.logical_id.to_string(),
            reason.reason.code(),
        );
        tasks.push(task);
    }
    tasks
}
