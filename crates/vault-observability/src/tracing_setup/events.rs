//! Structured log events for state changes operators care about.

/// A repair task was emitted for a degraded citation.
pub fn repair_emitted(task_id: &str, logical_id: &str, reason: &str) {
    tracing::info!(
        event = "repair_emitted",
        task_id = %task_id,
        logical_id = %logical_id,
        reason = %reason,
        "repair task emitted"
    );
}

/// A superseding manifest record landed.
pub fn migration_landed(logical_id: &str, record_id: &str, unverified_provenance: bool) {
    if unverified_provenance {
        tracing::warn!(
            event = "migration_landed",
            logical_id = %logical_id,
            record_id = %record_id,
            unverified_provenance,
            "migration landed with unverified provenance"
        );
    } else {
        tracing::info!(
            event = "migration_landed",
            logical_id = %logical_id,
            record_id = %record_id,
            "migration landed"
        );
    }
}

/// Repair found nothing to point at. Always loud.
pub fn no_candidate_replica(task_id: &str, logical_id: &str) {
    tracing::error!(
        event = "no_candidate_replica",
        task_id = %task_id,
        logical_id = %logical_id,
        "no candidate replica; possible data loss"
    );
}

/// A citation degraded.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// A run was sealed in the journal.
pub fn run_sealed(run_id: &str, tasks: usize, failed: usize) {
    tracing::info!(
        event = "run_sealed",
        run_id = %run_id,
        tasks,
        failed,
        "run sealed"
    );
}
