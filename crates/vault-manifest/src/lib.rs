//! Manifest Store: one append-only JSONL ledger per content kind.
//!
//! Every mutation is a single appended line. Supersession writes the new
//! record carrying the ids it replaces; `superseded_by` on older records is
//! derived when the ledger is loaded, so nothing on disk is ever rewritten.

pub mod ledger;
pub mod locks;
mod state;
pub mod store;
pub mod sync;

pub use ledger::{FileSink, LineSink};
pub use store::ManifestStore;
pub use sync::{apply_plan, plan_patch, PatchAction, PatchPlan};
