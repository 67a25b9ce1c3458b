//! # vault-pipeline
//!
//! Wires the vault components into one repair run:
//! evidence -> repair tasks -> execution -> journal -> run directory -> seal.

pub mod pipeline;
pub mod report;
pub mod run_dir;

pub use pipeline::{IncomingManifest, PipelineInput, RepairPipeline};
pub use report::{PipelineReport, PipelineStatus};
pub use run_dir::{ArtifactEntry, RunDirWriter, RunManifest};
