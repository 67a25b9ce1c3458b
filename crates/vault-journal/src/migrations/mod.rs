//! Schema migrations using PRAGMA user_version.

pub mod v001_initial;

use rusqlite::Connection;

use vault_core::errors::{JournalError, VaultResult};

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> VaultResult<()> {
    let current = current_version(conn)?;

    let migrations: &[(&str, u32)] = &[(v001_initial::MIGRATION_SQL, 1)];

    for (sql, version) in migrations {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| JournalError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| JournalError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            tracing::info!(version = version, "applied journal migration");
        }
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> VaultResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(crate::to_journal_err)
}
