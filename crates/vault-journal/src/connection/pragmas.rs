//! PRAGMA configuration applied to the journal connection.
//!
//! WAL mode, FULL sync, 5s busy_timeout, foreign_keys ON.

use rusqlite::Connection;

use vault_core::errors::{JournalError, VaultResult};

/// Apply durability and safety pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> VaultResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = FULL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| JournalError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })?;
    Ok(())
}

/// Verify that WAL mode is active.
pub fn verify_wal_mode(conn: &Connection) -> VaultResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(crate::to_journal_err)?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
