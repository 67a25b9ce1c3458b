//! # vault-journal
//!
//! Durable record of pipeline runs. [`SqliteJournal`] is the production
//! store; [`InMemoryJournal`] implements the same [`IRunJournal`] contract
//! for tests.
//!
//! [`IRunJournal`]: vault_core::traits::IRunJournal

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod sqlite;

pub use memory::InMemoryJournal;
pub use sqlite::SqliteJournal;

use vault_core::errors::{JournalError, VaultError};

pub(crate) fn to_journal_err(e: rusqlite::Error) -> VaultError {
    JournalError::SqliteError {
        message: e.to_string(),
    }
    .into()
}
