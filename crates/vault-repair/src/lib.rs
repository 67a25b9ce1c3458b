//! Repair side of the pipeline.
//!
//! - [`TaskExecutor`] interprets `verify` / `repair` / `apply` task specs,
//!   defaulting to a dry run.
//! - [`CandidateScanner`] searches vault roots for content matching a digest.
//! - [`PointerMigrator`] lands an approved repair as a superseding record.

pub mod executor;
pub mod migrator;
pub mod scanner;
pub mod state_machine;

pub use executor::TaskExecutor;
pub use migrator::PointerMigrator;
pub use scanner::{Candidate, CandidateScanner};
pub use state_machine::TaskRun;
