//! Task Executor: interprets TaskSpecs.
//!
//! The mode is consulted once, after the proposal is computed, so a dry
//! run reports exactly the record an apply run would write.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use vault_core::config::VaultConfig;
use vault_core::constants::TASK_SCHEMA_VERSION;
use vault_core::errors::{ErrorClass, RepairError, VaultError};
use vault_core::hashing::ContentHash;
use vault_core::models::{
    CandidateSource, ExecutionMode, FailureReason, ManifestRecord, Pointer, ProposedRepair,
    ReplicaHint, ResolutionOutcome, TaskKind, TaskResult, TaskSpec, TaskState, TaskStatus,
    TaskTarget, VaultKind, VaultUri,
};
use vault_core::traits::{IManifestStore, IPointerResolver};
use vault_observability::repair_span;
use vault_observability::tracing_setup::events;
use vault_resolver::PointerResolver;

use crate::migrator::PointerMigrator;
use crate::scanner::CandidateScanner;
use crate::state_machine::TaskRun;

/// What a task produced, before it is stamped into a [`TaskResult`].
struct Outcome {
    status: TaskStatus,
    detail: String,
    failure: Option<FailureReason>,
    proposal: Option<ProposedRepair>,
    mutations: Vec<ManifestRecord>,
    observed: Vec<ResolutionOutcome>,
}

impl Outcome {
    fn new(status: TaskStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            failure: None,
            proposal: None,
            mutations: Vec::new(),
            observed: Vec::new(),
        }
    }

    fn ok(detail: impl Into<String>) -> Self {
        Self::new(TaskStatus::Ok, detail)
    }

    fn skipped(detail: impl Into<String>) -> Self {
        Self::new(TaskStatus::Skipped, detail)
    }

    fn failed(reason: FailureReason, detail: impl Into<String>) -> Self {
        let mut outcome = Self::new(TaskStatus::Failed, detail);
        outcome.failure = Some(reason);
        outcome
    }

    fn invalid(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::failed(
            FailureReason::InvalidTask {
                reason: reason.clone(),
            },
            reason,
        )
    }

    fn from_error(err: &VaultError) -> Self {
        let reason = match err {
            VaultError::RepairError(RepairError::NoCandidateReplica { .. }) => {
                FailureReason::NoCandidateReplica
            }
            VaultError::RepairError(RepairError::ProposalStale { path, .. }) => {
                FailureReason::ProposalStale {
                    replica_path: path.clone(),
                }
            }
            VaultError::RepairError(RepairError::ReplicaUnreadable { path, .. }) => {
                FailureReason::Availability {
                    replica_path: path.clone(),
                }
            }
            other if other.class() == ErrorClass::Write => FailureReason::WriteFailed {
                reason: other.to_string(),
            },
            other => FailureReason::InvalidTask {
                reason: other.to_string(),
            },
        };
        Self::failed(reason, err.to_string())
    }

    fn observing(mut self, outcome: ResolutionOutcome) -> Self {
        self.observed.push(without_bytes(outcome));
        self
    }
}

fn without_bytes(mut outcome: ResolutionOutcome) -> ResolutionOutcome {
    if let ResolutionOutcome::Resolved { bytes, .. } = &mut outcome {
        bytes.clear();
    }
    outcome
}

fn failure_of(logical_id: &VaultUri, outcome: &ResolutionOutcome) -> FailureReason {
    match outcome {
        ResolutionOutcome::HashMismatch {
            expected, actual, ..
        } => FailureReason::Integrity {
            expected: expected.clone(),
            actual: actual.clone(),
        },
        ResolutionOutcome::ReplicaMissing { replica_path } => FailureReason::Availability {
            replica_path: replica_path.clone(),
        },
        ResolutionOutcome::NotFound => FailureReason::Availability {
            replica_path: logical_id.to_string(),
        },
        ResolutionOutcome::RangeOutOfBounds { size, .. } => FailureReason::InvalidTask {
            reason: format!("range outside replica of {size} bytes"),
        },
        ResolutionOutcome::Resolved { .. } => FailureReason::InvalidTask {
            reason: "resolved outcome is not a failure".into(),
        },
    }
}

pub struct TaskExecutor {
    store: Arc<dyn IManifestStore>,
    resolver: Arc<PointerResolver>,
    migrator: PointerMigrator,
    scanner: CandidateScanner,
}

impl TaskExecutor {
    pub fn new(
        store: Arc<dyn IManifestStore>,
        resolver: Arc<PointerResolver>,
        config: &VaultConfig,
    ) -> Self {
        let locator = resolver.locator().clone();
        Self {
            migrator: PointerMigrator::new(Arc::clone(&store), locator.clone()),
            scanner: CandidateScanner::new(locator.roots().clone(), config.repair.clone()),
            store,
            resolver,
        }
    }

    pub fn migrator(&self) -> &PointerMigrator {
        &self.migrator
    }

    /// Run tasks one after another, in order.
    pub fn execute_all(&self, specs: &[TaskSpec]) -> Vec<TaskResult> {
        specs.iter().map(|spec| self.execute(spec)).collect()
    }

    /// Execute one task. Never panics and never returns an error: every
    /// failure is a `Failed` result carrying a typed reason.
    pub fn execute(&self, spec: &TaskSpec) -> TaskResult {
        let started = Instant::now();
        let span = repair_span!(spec.task_id, spec.kind, spec.mode);
        let _enter = span.enter();

        let mut run = TaskRun::new(&spec.task_id);
        let outcome = match run.transition(TaskState::Running) {
            Ok(()) => self.dispatch(spec),
            Err(e) => Outcome::from_error(&e),
        };

        let terminal = match outcome.status {
            TaskStatus::Ok => TaskState::Done,
            TaskStatus::Skipped => TaskState::Skipped,
            TaskStatus::Failed => TaskState::Failed,
        };
        if let Err(e) = run.transition(terminal) {
            error!(task_id = %spec.task_id, error = %e, "task state machine rejected transition");
        }

        let result = TaskResult {
            task_id: spec.task_id.clone(),
            status: outcome.status,
            state: run.state(),
            detail: outcome.detail,
            mutations: outcome.mutations,
            failure: outcome.failure,
            proposal: outcome.proposal,
            observed: outcome.observed,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        if result.is_failed() {
            error!(
                task_id = %result.task_id,
                failure = ?result.failure,
                detail = %result.detail,
                "task failed"
            );
        } else {
            info!(
                task_id = %result.task_id,
                status = result.status.as_str(),
                mutations = result.mutations.len(),
                detail = %result.detail,
                "task finished"
            );
        }
        result
    }

    fn dispatch(&self, spec: &TaskSpec) -> Outcome {
        if spec.schema_version != TASK_SCHEMA_VERSION {
            return Outcome::invalid(format!(
                "unsupported schema_version {}",
                spec.schema_version
            ));
        }
        match (&spec.kind, &spec.target) {
            (TaskKind::Verify, TaskTarget::Manifest { kind }) => self.verify_manifest(*kind),
            (_, TaskTarget::Manifest { .. }) => {
                Outcome::invalid("only verify tasks may target a whole manifest")
            }
            (
                kind,
                TaskTarget::Pointer {
                    logical_id,
                    range,
                    expected_hash,
                    hint,
                    proposed_replica,
                },
            ) => {
                let pointer = Pointer {
                    logical_id: logical_id.clone(),
                    range: *range,
                    expected_hash: expected_hash.clone(),
                };
                match kind {
                    TaskKind::Verify => self.verify_pointer(&pointer),
                    TaskKind::Repair => self.repair(spec, &pointer, hint.as_ref()),
                    TaskKind::Apply => match proposed_replica {
                        Some(path) => self.apply(spec.mode, &pointer, path),
                        None => Outcome::invalid("apply task needs a proposed_replica"),
                    },
                }
            }
        }
    }

    fn verify_pointer(&self, pointer: &Pointer) -> Outcome {
        let outcome = self.resolver.resolve_pointer(pointer);
        let verdict = match &outcome {
            ResolutionOutcome::Resolved { verified_hash, .. } => {
                Outcome::ok(format!("{} verified as {verified_hash}", pointer.logical_id))
            }
            failed => Outcome::failed(
                failure_of(&pointer.logical_id, failed),
                format!("{} {}", pointer.logical_id, failed.label()),
            ),
        };
        verdict.observing(outcome)
    }

    fn verify_manifest(&self, kind: VaultKind) -> Outcome {
        let report = match self.resolver.verify_manifest(kind) {
            Ok(report) => report,
            Err(e) => return Outcome::from_error(&e),
        };
        let detail = format!(
            "{kind}: {} of {} current records verified",
            report.verified, report.checked
        );
        let mut outcome = match report.failures.first() {
            None => Outcome::ok(detail),
            Some(first) => Outcome::failed(failure_of(&first.logical_id, &first.outcome), detail),
        };
        outcome.observed = report.failures.into_iter().map(|f| f.outcome).collect();
        outcome
    }

    fn repair(&self, spec: &TaskSpec, pointer: &Pointer, hint: Option<&ReplicaHint>) -> Outcome {
        let subject = &pointer.logical_id;
        let current = self.resolver.resolve_pointer(pointer);
        if current.is_resolved() {
            return Outcome::skipped(format!("{subject} already resolves")).observing(current);
        }

        let history = match self.store.history(subject) {
            Ok(history) => history,
            Err(e) => return Outcome::from_error(&e).observing(current),
        };
        let want = hint
            .and_then(|h| h.content_hash.clone())
            .or_else(|| pointer.expected_hash.clone())
            .or_else(|| history.last().map(|r| r.content_hash.clone()));
        let Some(want) = want else {
            events::no_candidate_replica(&spec.task_id, &subject.to_string());
            return Outcome::failed(
                FailureReason::NoCandidateReplica,
                format!("{subject} has no known-good digest to search for"),
            )
            .observing(current);
        };
        let size_hint = history
            .iter()
            .rev()
            .find(|r| r.content_hash == want)
            .map(|r| r.size);

        let Some((replica_path, source)) = self.find_candidate(subject, &want, size_hint, hint)
        else {
            events::no_candidate_replica(&spec.task_id, &subject.to_string());
            return Outcome::failed(
                FailureReason::NoCandidateReplica,
                format!("no replica of {subject} hashing to {want} under any vault root"),
            )
            .observing(current);
        };

        match self.migrator.preview(subject, &replica_path, source) {
            Ok(proposal) => self.land(spec.mode, proposal).observing(current),
            Err(e) => Outcome::from_error(&e).observing(current),
        }
    }

    fn apply(&self, mode: ExecutionMode, pointer: &Pointer, replica_path: &str) -> Outcome {
        let proposal = match self.migrator.preview(
            &pointer.logical_id,
            replica_path,
            CandidateSource::Explicit,
        ) {
            Ok(proposal) => proposal,
            Err(e) => return Outcome::from_error(&e),
        };
        if let Some(expected) = &pointer.expected_hash {
            if *expected != proposal.content_hash {
                return Outcome::failed(
                    FailureReason::Integrity {
                        expected: expected.clone(),
                        actual: proposal.content_hash.clone(),
                    },
                    format!("{replica_path} does not hold the expected content"),
                );
            }
        }
        self.land(mode, proposal)
    }

    /// The only place the execution mode is consulted.
    fn land(&self, mode: ExecutionMode, proposal: ProposedRepair) -> Outcome {
        let summary = format!(
            "{} -> {} (supersedes {}{})",
            proposal.subject,
            proposal.replica_path,
            proposal.supersedes.len(),
            if proposal.unverified_provenance {
                ", unverified provenance"
            } else {
                ""
            }
        );
        let mut outcome = match mode {
            ExecutionMode::DryRun => Outcome::ok(format!("would migrate {summary}")),
            ExecutionMode::Apply => match self.migrator.commit(&proposal) {
                Ok(record) => {
                    let mut outcome = Outcome::ok(format!("migrated {summary}"));
                    outcome.mutations.push(record);
                    outcome
                }
                Err(e) => Outcome::from_error(&e),
            },
        };
        outcome.proposal = Some(proposal);
        outcome
    }

    /// Manifest hash index first, then a rescan of the vault roots that
    /// starts in the directory of the replica the hint names.
    fn find_candidate(
        &self,
        subject: &VaultUri,
        want: &ContentHash,
        size_hint: Option<u64>,
        hint: Option<&ReplicaHint>,
    ) -> Option<(String, CandidateSource)> {
        let locator = self.resolver.locator();
        let indexed = match self.store.find_by_hash(want) {
            Ok(records) => records,
            Err(e) => {
                warn!(want = %want, error = %e, "hash index lookup failed; falling back to scan");
                Vec::new()
            }
        };
        for record in indexed.iter().filter(|r| &r.logical_id != subject) {
            if !self.resolver.check_record(record, None).is_resolved() {
                continue;
            }
            if let Some(path) = locator.locate(&record.logical_id, &record.replica_path) {
                let replica_path = locator.replica_path_for(subject.vault_id(), &path);
                return Some((replica_path, CandidateSource::ManifestIndex));
            }
        }

        let start = hint
            .and_then(|h| h.replica_path.as_deref())
            .and_then(|path| locator.locate(subject, path))
            .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));
        self.scanner
            .find(want, size_hint, subject.vault_id(), start.as_deref())
            .map(|c| {
                (
                    locator.replica_path_for(subject.vault_id(), &c.path),
                    CandidateSource::VaultScan,
                )
            })
    }
}
