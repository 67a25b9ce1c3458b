//! Manifest sync planning: reconcile a replica's manifest file with the
//! base ledger without ever mutating history.

mod plan;

pub use plan::{apply_plan, plan_patch, PatchAction, PatchPlan};
