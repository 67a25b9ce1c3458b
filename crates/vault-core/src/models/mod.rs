mod degradation_event;
mod evidence;
mod manifest_record;
mod repair_task;
mod resolution;
mod run_record;
mod task;
mod vault_uri;

pub use degradation_event::DegradationEvent;
pub use evidence::{BundleDiagnostics, DegradationReason, EvidenceReference, RepairReason};
pub use manifest_record::ManifestRecord;
pub use repair_task::{RepairTask, RepairTaskType, ReplicaHint};
pub use resolution::{Pointer, PointerRange, ResolutionOutcome};
pub use run_record::{new_run_id, RunContext, RunRecord, RunSummary};
pub use task::{
    CandidateSource, ExecutionMode, FailureReason, ProposedRepair, TaskKind, TaskResult,
    TaskSpec, TaskState, TaskStatus, TaskTarget,
};
pub use vault_uri::{VaultKind, VaultUri};
