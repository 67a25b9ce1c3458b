//! Query functions over the journal tables, one module per table.

pub mod runs;
pub mod task_records;

use chrono::{DateTime, SecondsFormat, Utc};

use vault_core::errors::{JournalError, VaultResult};

/// Fixed-width RFC 3339 so text order is time order.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(raw: &str) -> VaultResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            JournalError::SqliteError {
                message: format!("bad timestamp {raw:?}: {e}"),
            }
            .into()
        })
}
