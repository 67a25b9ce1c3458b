use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{TaskResult, TaskSpec};

/// Everything needed to replay a run exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    pub vault_roots: BTreeMap<String, PathBuf>,
    pub config_snapshot: serde_json::Value,
}

/// One pipeline invocation. Sealed runs are complete and replayable; an
/// unsealed run is a crash signal for operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub context: RunContext,
    pub task_specs: Vec<TaskSpec>,
    pub task_results: Vec<TaskResult>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    pub fn is_sealed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Summary row for listing runs without loading their tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub task_count: usize,
    pub failed_count: usize,
}

/// Time-sortable, unique run identifier: `RUN-YYYYMMDD-HHMMSS-<8 hex>`.
pub fn new_run_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}{}-{}",
        crate::constants::RUN_ID_PREFIX,
        Utc::now().format("%Y%m%d-%H%M%S"),
        &suffix[..8]
    )
}
