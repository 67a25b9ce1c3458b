//! TaskSpec / TaskResult (schema v0.1), the contract external orchestration
//! is built against.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ErrorClass;
use crate::hashing::ContentHash;
use crate::models::{
    ManifestRecord, PointerRange, RepairTask, ReplicaHint, ResolutionOutcome, VaultKind, VaultUri,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Resolve and report; never mutates.
    Verify,
    /// Compute a corrected record; write it only in `apply` mode.
    Repair,
    /// Commit a previously proposed replica.
    Apply,
}

/// Consulted once at the top of execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    DryRun,
    Apply,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskTarget {
    Pointer {
        logical_id: VaultUri,
        #[serde(default)]
        range: Option<PointerRange>,
        #[serde(default)]
        expected_hash: Option<ContentHash>,
        #[serde(default)]
        hint: Option<ReplicaHint>,
        /// Replica chosen by an earlier dry run; required for `apply` tasks.
        #[serde(default)]
        proposed_replica: Option<String>,
    },
    /// Every current record of one manifest kind.
    Manifest { kind: VaultKind },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub task_id: String,
    pub kind: TaskKind,
    pub target: TaskTarget,
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(default = "schema_version")]
    pub schema_version: String,
}

fn schema_version() -> String {
    crate::constants::TASK_SCHEMA_VERSION.to_string()
}

impl TaskSpec {
    pub fn new(task_id: impl Into<String>, kind: TaskKind, target: TaskTarget) -> Self {
        Self {
            task_id: task_id.into(),
            kind,
            target,
            mode: ExecutionMode::DryRun,
            idempotency_key: None,
            schema_version: schema_version(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// A `repair` spec for an emitted repair task.
    pub fn from_repair_task(task: &RepairTask, mode: ExecutionMode) -> Self {
        let expected_hash = task
            .proposed_action
            .as_ref()
            .and_then(|h| h.content_hash.clone());
        Self {
            task_id: task.task_id.clone(),
            kind: TaskKind::Repair,
            target: TaskTarget::Pointer {
                logical_id: task.subject_logical_id.clone(),
                range: None,
                expected_hash,
                hint: task.proposed_action.clone(),
                proposed_replica: None,
            },
            mode,
            idempotency_key: Some(task.idempotency_key.clone()),
            schema_version: schema_version(),
        }
    }

    pub fn subject(&self) -> Option<&VaultUri> {
        match &self.target {
            TaskTarget::Pointer { logical_id, .. } => Some(logical_id),
            TaskTarget::Manifest { .. } => None,
        }
    }
}

/// Per-task lifecycle: `Pending -> Running -> {Done, Failed, Skipped}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

impl TaskState {
    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Done)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Skipped)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Ok,
    Skipped,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Typed reason a task ended `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FailureReason {
    NoCandidateReplica,
    Integrity {
        expected: ContentHash,
        actual: ContentHash,
    },
    Availability {
        replica_path: String,
    },
    WriteFailed {
        reason: String,
    },
    ProposalStale {
        replica_path: String,
    },
    InvalidTask {
        reason: String,
    },
}

impl FailureReason {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NoCandidateReplica => ErrorClass::NoCandidateReplica,
            Self::Integrity { .. } | Self::ProposalStale { .. } => ErrorClass::Integrity,
            Self::Availability { .. } => ErrorClass::Availability,
            Self::WriteFailed { .. } => ErrorClass::Write,
            Self::InvalidTask { .. } => ErrorClass::Invalid,
        }
    }
}

/// Where a repair candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Another current manifest record with the same digest.
    ManifestIndex,
    /// A file found by walking the vault roots.
    VaultScan,
    /// Named explicitly by an `apply` task.
    Explicit,
}

/// A corrected manifest record, computed identically in both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedRepair {
    pub subject: VaultUri,
    pub replica_path: String,
    pub content_hash: ContentHash,
    pub size: u64,
    pub source: CandidateSource,
    /// Current records the new record would supersede.
    pub supersedes: Vec<Uuid>,
    pub unverified_provenance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub state: TaskState,
    pub detail: String,
    /// Empty unless mode = apply and the mutation landed.
    #[serde(default)]
    pub mutations: Vec<ManifestRecord>,
    #[serde(default)]
    pub failure: Option<FailureReason>,
    #[serde(default)]
    pub proposal: Option<ProposedRepair>,
    /// Outcomes observed by verify tasks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observed: Vec<ResolutionOutcome>,
    pub elapsed_ms: u64,
}

impl TaskResult {
    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}
