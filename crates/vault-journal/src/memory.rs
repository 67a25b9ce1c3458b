//! In-memory run journal for tests. Same contract as the SQLite store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use vault_core::errors::{JournalError, VaultResult};
use vault_core::models::{new_run_id, RunContext, RunRecord, RunSummary, TaskResult, TaskSpec, TaskStatus};
use vault_core::traits::IRunJournal;

#[derive(Default)]
struct State {
    /// In begin order.
    runs: Vec<RunRecord>,
    /// Every recorded result in record order, tagged with its run.
    log: Vec<(String, TaskResult)>,
}

impl State {
    fn run_mut(&mut self, run_id: &str) -> VaultResult<&mut RunRecord> {
        self.runs
            .iter_mut()
            .find(|r| r.run_id == run_id)
            .ok_or_else(|| {
                JournalError::RunNotFound {
                    run_id: run_id.to_string(),
                }
                .into()
            })
    }
}

#[derive(Default)]
pub struct InMemoryJournal {
    state: Mutex<State>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IRunJournal for InMemoryJournal {
    fn begin(&self, context: RunContext) -> VaultResult<String> {
        let run_id = new_run_id();
        self.lock().runs.push(RunRecord {
            run_id: run_id.clone(),
            started_at: Utc::now(),
            context,
            task_specs: Vec::new(),
            task_results: Vec::new(),
            completed_at: None,
        });
        Ok(run_id)
    }

    fn record(&self, run_id: &str, spec: &TaskSpec, result: &TaskResult) -> VaultResult<()> {
        let mut state = self.lock();
        let run = state.run_mut(run_id)?;
        if run.is_sealed() {
            return Err(JournalError::RunSealed {
                run_id: run_id.to_string(),
            }
            .into());
        }
        run.task_specs.push(spec.clone());
        run.task_results.push(result.clone());
        state.log.push((run_id.to_string(), result.clone()));
        Ok(())
    }

    fn seal(&self, run_id: &str) -> VaultResult<()> {
        let mut state = self.lock();
        let run = state.run_mut(run_id)?;
        if run.completed_at.is_none() {
            run.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    fn load(&self, run_id: &str) -> VaultResult<RunRecord> {
        self.lock().run_mut(run_id).map(|r| r.clone())
    }

    fn list_runs(&self) -> VaultResult<Vec<RunSummary>> {
        let state = self.lock();
        Ok(state
            .runs
            .iter()
            .rev()
            .map(|r| RunSummary {
                run_id: r.run_id.clone(),
                started_at: r.started_at,
                completed_at: r.completed_at,
                task_count: r.task_results.len(),
                failed_count: r.task_results.iter().filter(|t| t.is_failed()).count(),
            })
            .collect())
    }

    fn unsealed_runs(&self) -> VaultResult<Vec<String>> {
        Ok(self
            .lock()
            .runs
            .iter()
            .filter(|r| !r.is_sealed())
            .map(|r| r.run_id.clone())
            .collect())
    }

    fn query_tasks(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> VaultResult<Vec<(String, TaskResult)>> {
        Ok(self
            .lock()
            .log
            .iter()
            .rev()
            .filter(|(_, r)| status.map_or(true, |s| r.status == s))
            .take(limit)
            .cloned()
            .collect())
    }
}
