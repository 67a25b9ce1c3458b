//! Connection setup for the journal database.

pub mod pragmas;

pub use pragmas::{apply_pragmas, verify_wal_mode};
