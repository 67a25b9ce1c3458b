/// Repair executor and migrator errors.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("no candidate replica for {subject} under any configured vault root")]
    NoCandidateReplica { subject: String },

    #[error("invalid task {task_id}: {reason}")]
    InvalidTask { task_id: String, reason: String },

    #[error("invalid task state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("replica {path} unreadable: {reason}")]
    ReplicaUnreadable { path: String, reason: String },

    #[error("proposed replica {path} no longer hashes to {expected}")]
    ProposalStale { path: String, expected: String },
}
