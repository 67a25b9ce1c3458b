//! Queries for the task_records table: append-only, ordered by `seq`
//! within a run.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use vault_core::errors::VaultResult;
use vault_core::models::{TaskResult, TaskSpec, TaskStatus};

use super::format_ts;
use crate::to_journal_err;

pub fn next_seq(conn: &Connection, run_id: &str) -> VaultResult<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(seq), -1) + 1 FROM task_records WHERE run_id = ?1",
        params![run_id],
        |row| row.get(0),
    )
    .map_err(to_journal_err)
}

pub fn insert_task(
    conn: &Connection,
    run_id: &str,
    seq: i64,
    spec: &TaskSpec,
    result: &TaskResult,
    recorded_at: &DateTime<Utc>,
) -> VaultResult<()> {
    let spec_json = serde_json::to_string(spec)?;
    let result_json = serde_json::to_string(result)?;
    conn.execute(
        "INSERT INTO task_records
            (run_id, seq, task_id, status, spec_json, result_json, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run_id,
            seq,
            result.task_id,
            result.status.as_str(),
            spec_json,
            result_json,
            format_ts(recorded_at)
        ],
    )
    .map_err(to_journal_err)?;
    Ok(())
}

/// Specs and results of one run, in execution order.
pub fn tasks_of_run(conn: &Connection, run_id: &str) -> VaultResult<(Vec<TaskSpec>, Vec<TaskResult>)> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT spec_json, result_json FROM task_records WHERE run_id = ?1 ORDER BY seq",
        )
        .map_err(to_journal_err)?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(to_journal_err)?;

    let mut specs = Vec::new();
    let mut results = Vec::new();
    for row in rows {
        let (spec_json, result_json) = row.map_err(to_journal_err)?;
        specs.push(serde_json::from_str(&spec_json)?);
        results.push(serde_json::from_str(&result_json)?);
    }
    Ok((specs, results))
}

/// Recorded results across runs, newest first.
pub fn query_recent(
    conn: &Connection,
    status: Option<TaskStatus>,
    limit: usize,
) -> VaultResult<Vec<(String, TaskResult)>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT run_id, result_json FROM task_records
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY id DESC LIMIT ?2",
        )
        .map_err(to_journal_err)?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(params![status.map(TaskStatus::as_str), limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(to_journal_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (run_id, result_json) = row.map_err(to_journal_err)?;
        out.push((run_id, serde_json::from_str(&result_json)?));
    }
    Ok(out)
}
