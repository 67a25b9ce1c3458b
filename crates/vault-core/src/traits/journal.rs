use crate::errors::VaultResult;
use crate::models::{RunContext, RunRecord, RunSummary, TaskResult, TaskSpec, TaskStatus};

/// Durable, append-only record of pipeline invocations.
pub trait IRunJournal: Send + Sync {
    /// Open a run; returns its id.
    fn begin(&self, context: RunContext) -> VaultResult<String>;

    /// Append one executed task to an open run.
    fn record(&self, run_id: &str, spec: &TaskSpec, result: &TaskResult) -> VaultResult<()>;

    /// Mark a run complete. Idempotent.
    fn seal(&self, run_id: &str) -> VaultResult<()>;

    fn load(&self, run_id: &str) -> VaultResult<RunRecord>;

    /// All runs, newest first.
    fn list_runs(&self) -> VaultResult<Vec<RunSummary>>;

    /// Runs that were begun but never sealed.
    fn unsealed_runs(&self) -> VaultResult<Vec<String>>;

    /// Recorded results, optionally filtered by status, newest first.
    fn query_tasks(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> VaultResult<Vec<(String, TaskResult)>>;
}
