/// Run journal errors.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("run {run_id} is sealed; no further records accepted")]
    RunSealed { run_id: String },

    #[error("run {run_id} is not sealed; unsealed runs are not replayable")]
    RunNotSealed { run_id: String },
}
