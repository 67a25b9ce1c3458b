//! SQLite-backed run journal. One serialized write connection; every
//! mutation runs inside a transaction.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use vault_core::config::VaultConfig;
use vault_core::errors::{JournalError, VaultError, VaultResult};
use vault_core::models::{new_run_id, RunContext, RunRecord, RunSummary, TaskResult, TaskSpec, TaskStatus};
use vault_core::traits::IRunJournal;

use crate::connection::apply_pragmas;
use crate::queries::{runs, task_records};
use crate::{migrations, to_journal_err};

pub struct SqliteJournal {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteJournal {
    /// Open (creating if needed) a journal database, apply pragmas, run migrations.
    pub fn open(path: &Path) -> VaultResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| VaultError::io(parent, e))?;
        }
        let conn = Connection::open(path).map_err(to_journal_err)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> VaultResult<Self> {
        let conn = Connection::open_in_memory().map_err(to_journal_err)?;
        Self::init(conn, None)
    }

    /// Open the journal at `[pipeline] journal_path`.
    pub fn from_config(config: &VaultConfig) -> VaultResult<Self> {
        Self::open(&config.journal_path())
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> VaultResult<Self> {
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the serialized connection.
    pub fn with_conn<F, T>(&self, f: F) -> VaultResult<T>
    where
        F: FnOnce(&Connection) -> VaultResult<T>,
    {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IRunJournal for SqliteJournal {
    fn begin(&self, context: RunContext) -> VaultResult<String> {
        let run_id = new_run_id();
        let started_at = Utc::now();
        let conn = self.lock();
        runs::insert_run(&conn, &run_id, &started_at, &context)?;
        info!(run_id = %run_id, "run begun");
        Ok(run_id)
    }

    fn record(&self, run_id: &str, spec: &TaskSpec, result: &TaskResult) -> VaultResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(to_journal_err)?;
        match runs::completed_at(&tx, run_id)? {
            None => {
                return Err(JournalError::RunNotFound {
                    run_id: run_id.to_string(),
                }
                .into())
            }
            Some(Some(_)) => {
                return Err(JournalError::RunSealed {
                    run_id: run_id.to_string(),
                }
                .into())
            }
            Some(None) => {}
        }
        let seq = task_records::next_seq(&tx, run_id)?;
        task_records::insert_task(&tx, run_id, seq, spec, result, &Utc::now())?;
        tx.commit().map_err(to_journal_err)?;
        debug!(run_id = %run_id, task_id = %result.task_id, seq, status = result.status.as_str(), "task journaled");
        Ok(())
    }

    fn seal(&self, run_id: &str) -> VaultResult<()> {
        let conn = self.lock();
        if runs::mark_sealed(&conn, run_id, &Utc::now())? {
            info!(run_id = %run_id, "run sealed in journal");
            return Ok(());
        }
        match runs::completed_at(&conn, run_id)? {
            None => Err(JournalError::RunNotFound {
                run_id: run_id.to_string(),
            }
            .into()),
            Some(_) => Ok(()),
        }
    }

    fn load(&self, run_id: &str) -> VaultResult<RunRecord> {
        let conn = self.lock();
        let row = runs::get_run(&conn, run_id)?.ok_or_else(|| JournalError::RunNotFound {
            run_id: run_id.to_string(),
        })?;
        let (task_specs, task_results) = task_records::tasks_of_run(&conn, run_id)?;
        Ok(RunRecord {
            run_id: row.run_id,
            started_at: row.started_at,
            context: row.context,
            task_specs,
            task_results,
            completed_at: row.completed_at,
        })
    }

    fn list_runs(&self) -> VaultResult<Vec<RunSummary>> {
        runs::list_summaries(&self.lock())
    }

    fn unsealed_runs(&self) -> VaultResult<Vec<String>> {
        runs::unsealed(&self.lock())
    }

    fn query_tasks(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> VaultResult<Vec<(String, TaskResult)>> {
        task_records::query_recent(&self.lock(), status, limit)
    }
}
