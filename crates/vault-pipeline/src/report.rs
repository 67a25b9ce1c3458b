use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use vault_core::models::{BundleDiagnostics, TaskResult};

/// Overall outcome of a run. Always present, even when nothing degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// No citation degraded and nothing needed doing.
    Clean,
    /// At least one repair landed and nothing failed.
    Repaired,
    /// Dry run: repairs were proposed, none written.
    Proposed,
    /// Failures or unresolved degradations remain.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub status: PipelineStatus,
    pub diagnostics: BundleDiagnostics,
    pub results: Vec<TaskResult>,
    pub run_dir: PathBuf,
}

impl PipelineReport {
    pub fn failed(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| r.is_failed())
    }
}
