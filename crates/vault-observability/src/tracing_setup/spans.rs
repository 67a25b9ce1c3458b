//! Span definitions per operation: resolve, repair, migrate, pipeline.

/// Create a resolution span.
#[macro_export]
macro_rules! resolve_span {
    ($logical_id:expr) => {
        tracing::debug_span!("vault.resolve", logical_id = %$logical_id)
    };
}

/// Create a repair task span.
#[macro_export]
macro_rules! repair_span {
    ($task_id:expr, $kind:expr, $mode:expr) => {
        tracing::info_span!("vault.repair", task_id = %$task_id, kind = ?$kind, mode = ?$mode)
    };
}

/// Create a migration span.
#[macro_export]
macro_rules! migrate_span {
    ($logical_id:expr) => {
        tracing::info_span!("vault.migrate", logical_id = %$logical_id)
    };
}

/// Create a pipeline run span.
#[macro_export]
macro_rules! pipeline_span {
    ($run_id:expr) => {
        tracing::info_span!("vault.pipeline", run_id = %$run_id)
    };
}
