//! # vault-core
//!
//! Foundation crate for the memory vault.
//! Defines the vault URI, content addressing, data model, traits, errors,
//! config, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::VaultConfig;
pub use errors::{ErrorClass, VaultError, VaultResult};
pub use hashing::ContentHash;
pub use models::{ManifestRecord, ResolutionOutcome, VaultKind, VaultUri};
