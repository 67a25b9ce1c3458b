//! Queries for the runs table.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use vault_core::errors::VaultResult;
use vault_core::models::{RunContext, RunSummary};

use super::{format_ts, parse_ts};
use crate::to_journal_err;

/// A run row without its tasks.
#[derive(Debug, Clone)]
pub struct RunRow {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub context: RunContext,
    pub completed_at: Option<DateTime<Utc>>,
}

pub fn insert_run(
    conn: &Connection,
    run_id: &str,
    started_at: &DateTime<Utc>,
    context: &RunContext,
) -> VaultResult<()> {
    let context_json = serde_json::to_string(context)?;
    conn.execute(
        "INSERT INTO runs (run_id, started_at, context_json) VALUES (?1, ?2, ?3)",
        params![run_id, format_ts(started_at), context_json],
    )
    .map_err(to_journal_err)?;
    Ok(())
}

/// Set `completed_at` on an unsealed run. Returns false when the run is
/// missing or already sealed.
pub fn mark_sealed(conn: &Connection, run_id: &str, completed_at: &DateTime<Utc>) -> VaultResult<bool> {
    let changed = conn
        .execute(
            "UPDATE runs SET completed_at = ?2 WHERE run_id = ?1 AND completed_at IS NULL",
            params![run_id, format_ts(completed_at)],
        )
        .map_err(to_journal_err)?;
    Ok(changed == 1)
}

/// `None` when the run does not exist; `Some(None)` when it is unsealed.
pub fn completed_at(conn: &Connection, run_id: &str) -> VaultResult<Option<Option<String>>> {
    conn.query_row(
        "SELECT completed_at FROM runs WHERE run_id = ?1",
        params![run_id],
        |row| row.get::<_, Option<String>>(0),
    )
    .optional()
    .map_err(to_journal_err)
}

pub fn get_run(conn: &Connection, run_id: &str) -> VaultResult<Option<RunRow>> {
    let raw = conn
        .query_row(
            "SELECT run_id, started_at, context_json, completed_at FROM runs WHERE run_id = ?1",
            params![run_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()
        .map_err(to_journal_err)?;

    let Some((run_id, started_at, context_json, completed_at)) = raw else {
        return Ok(None);
    };
    Ok(Some(RunRow {
        run_id,
        started_at: parse_ts(&started_at)?,
        context: serde_json::from_str(&context_json)?,
        completed_at: completed_at.as_deref().map(parse_ts).transpose()?,
    }))
}

/// All runs with task counts, newest first.
pub fn list_summaries(conn: &Connection) -> VaultResult<Vec<RunSummary>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT r.run_id, r.started_at, r.completed_at,
                    COUNT(t.id),
                    COALESCE(SUM(CASE WHEN t.status = 'failed' THEN 1 ELSE 0 END), 0)
             FROM runs r LEFT JOIN task_records t ON t.run_id = r.run_id
             GROUP BY r.run_id
             ORDER BY r.started_at DESC, r.run_id DESC",
        )
        .map_err(to_journal_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })
        .map_err(to_journal_err)?;

    let mut summaries = Vec::new();
    for row in rows {
        let (run_id, started_at, completed_at, task_count, failed_count) =
            row.map_err(to_journal_err)?;
        summaries.push(RunSummary {
            run_id,
            started_at: parse_ts(&started_at)?,
            completed_at: completed_at.as_deref().map(parse_ts).transpose()?,
            task_count: usize::try_from(task_count).unwrap_or(0),
            failed_count: usize::try_from(failed_count).unwrap_or(0),
        });
    }
    Ok(summaries)
}

/// Ids of runs begun but never sealed, oldest first.
pub fn unsealed(conn: &Connection) -> VaultResult<Vec<String>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT run_id FROM runs WHERE completed_at IS NULL ORDER BY started_at, run_id",
        )
        .map_err(to_journal_err)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(to_journal_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_journal_err)
}
