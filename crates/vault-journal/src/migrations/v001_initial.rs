//! V001: runs and task_records.

pub const MIGRATION_SQL: &str = r#"
-- One row per pipeline invocation. completed_at NULL means unsealed.
CREATE TABLE IF NOT EXISTS runs (
    run_id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    context_json TEXT NOT NULL,
    completed_at TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_runs_started ON runs(started_at);
CREATE INDEX IF NOT EXISTS idx_runs_unsealed ON runs(run_id) WHERE completed_at IS NULL;

-- One row per executed task, in execution order within its run.
CREATE TABLE IF NOT EXISTS task_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL REFERENCES runs(run_id),
    seq INTEGER NOT NULL,
    task_id TEXT NOT NULL,
    status TEXT NOT NULL,
    spec_json TEXT NOT NULL,
    result_json TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    UNIQUE(run_id, seq)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_task_records_run ON task_records(run_id);
CREATE INDEX IF NOT EXISTS idx_task_records_status ON task_records(status);

-- Journal rows are never edited or removed.
CREATE TRIGGER IF NOT EXISTS task_records_no_update
BEFORE UPDATE ON task_records
BEGIN
    SELECT RAISE(ABORT, 'task_records is append-only');
END;

CREATE TRIGGER IF NOT EXISTS task_records_no_delete
BEFORE DELETE ON task_records
BEGIN
    SELECT RAISE(ABORT, 'task_records is append-only');
END;

CREATE TRIGGER IF NOT EXISTS runs_sealed_immutable
BEFORE UPDATE ON runs
WHEN OLD.completed_at IS NOT NULL
BEGIN
    SELECT RAISE(ABORT, 'run is sealed');
END;

CREATE TRIGGER IF NOT EXISTS runs_no_delete
BEFORE DELETE ON runs
BEGIN
    SELECT RAISE(ABORT, 'runs is append-only');
END;
"#;
