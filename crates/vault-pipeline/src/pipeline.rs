//! The repair pipeline.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use vault_core::config::VaultConfig;
use vault_core::errors::{JournalError, VaultResult};
use vault_core::models::{
    DegradationEvent, ExecutionMode, Pointer, RunContext, TaskResult, TaskSpec, TaskStatus,
    VaultKind,
};
use vault_core::traits::IRunJournal;
use vault_evidence::{EvidenceAssembler, EvidenceBundle};
use vault_journal::SqliteJournal;
use vault_manifest::{apply_plan, plan_patch, ManifestStore, PatchPlan};
use vault_observability::pipeline_span;
use vault_observability::tracing_setup::events;
use vault_observability::{DegradationTracker, TrackedDegradation};
use vault_repair::TaskExecutor;
use vault_resolver::{PointerResolver, ReplicaLocator};

use crate::report::{PipelineReport, PipelineStatus};
use crate::run_dir::{self, RunDirWriter, RunManifest};

/// A manifest file from another replica of the vault, to reconcile into
/// the base ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingManifest {
    pub kind: VaultKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineInput {
    pub citations: Vec<Pointer>,
    pub incoming_manifests: Vec<IncomingManifest>,
}

impl PipelineInput {
    pub fn new(citations: Vec<Pointer>) -> Self {
        Self {
            citations,
            incoming_manifests: Vec::new(),
        }
    }

    pub fn with_incoming(mut self, kind: VaultKind, path: impl Into<PathBuf>) -> Self {
        self.incoming_manifests.push(IncomingManifest {
            kind,
            path: path.into(),
        });
        self
    }
}

pub struct RepairPipeline {
    config: VaultConfig,
    store: Arc<ManifestStore>,
    assembler: EvidenceAssembler,
    executor: TaskExecutor,
    journal: Arc<dyn IRunJournal>,
    tracker: Mutex<DegradationTracker>,
}

impl RepairPipeline {
    pub fn new(config: VaultConfig, store: Arc<ManifestStore>, journal: Arc<dyn IRunJournal>) -> Self {
        let resolver = Arc::new(PointerResolver::from_config(store.clone(), &config));
        let assembler = EvidenceAssembler::new(resolver.clone(), config.evidence.clone());
        let executor = TaskExecutor::new(store.clone(), resolver, &config);
        Self {
            config,
            store,
            assembler,
            executor,
            journal,
            tracker: Mutex::new(DegradationTracker::new()),
        }
    }

    /// Validate config, init logging, open the manifest store and the
    /// SQLite journal it names.
    pub fn open(config: VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        vault_observability::tracing_setup::init(&config.observability);
        let store = Arc::new(ManifestStore::from_config(&config)?);
        let journal = Arc::new(SqliteJournal::from_config(&config)?);
        Ok(Self::new(config, store, journal))
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ManifestStore> {
        &self.store
    }

    pub fn journal(&self) -> &Arc<dyn IRunJournal> {
        &self.journal
    }

    /// Degradations observed across every run of this pipeline.
    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        self.tracker().events().to_vec()
    }

    pub fn run(&self, citations: &[Pointer], mode: ExecutionMode) -> VaultResult<PipelineReport> {
        self.run_input(&PipelineInput::new(citations.to_vec()), mode)
    }

    /// One full run. Per-task failures are data in the report; an `Err`
    /// means the journal or run directory could not be written, and the
    /// run is left unsealed.
    pub fn run_input(&self, input: &PipelineInput, mode: ExecutionMode) -> VaultResult<PipelineReport> {
        let started_at = Utc::now();
        let run_id = self.journal.begin(RunContext {
            vault_roots: self.config.vault.vault_roots.clone(),
            config_snapshot: self.config.snapshot(),
        })?;
        let span = pipeline_span!(run_id);
        let _enter = span.enter();
        info!(citations = input.citations.len(), mode = ?mode, "pipeline run started");

        let mut writer = RunDirWriter::create(&self.config.pipeline.runs_root, &run_id)?;

        let bundle = self.assembler.assemble(&input.citations).with_repair_tasks();
        self.track(&bundle);

        let specs: Vec<TaskSpec> = bundle
            .diagnostics
            .repair_tasks
            .iter()
            .map(|task| TaskSpec::from_repair_task(task, mode))
            .collect();

        let mut results = Vec::with_capacity(specs.len());
        for spec in &specs {
            let result = self.executor.execute(spec);
            self.journal.record(&run_id, spec, &result)?;
            writer.write_json(
                &format!("{}/{}.json", run_dir::TASK_RESULTS_DIR, spec.task_id),
                &result,
            )?;
            self.land(spec, &result, &mut writer)?;
            results.push(result);
        }

        let mut blocked_plans = 0;
        for (n, incoming) in input.incoming_manifests.iter().enumerate() {
            let plan = plan_patch(&self.store, incoming.kind, &incoming.path)?;
            writer.write_json(
                &format!("{}/{:03}_{}.json", run_dir::PATCH_PLANS_DIR, n, incoming.kind),
                &plan,
            )?;
            if plan.blocked {
                blocked_plans += 1;
                warn!(kind = %plan.kind, conflicts = plan.conflict_count(), "manifest patch blocked");
            } else if mode == ExecutionMode::Apply {
                apply_plan(&self.store, &plan, false)?;
            }
        }

        let status = classify(&bundle, &results, blocked_plans);
        let run_dir = writer.finish(RunManifest {
            run_id: run_id.clone(),
            mode,
            status,
            started_at,
            completed_at: Utc::now(),
            citations: input.citations.clone(),
            incoming_manifests: input
                .incoming_manifests
                .iter()
                .map(|m| m.path.clone())
                .collect(),
            outputs: Vec::new(),
        })?;

        self.journal.seal(&run_id)?;
        let failed = results.iter().filter(|r| r.is_failed()).count();
        events::run_sealed(&run_id, results.len(), failed);

        Ok(PipelineReport {
            run_id,
            status,
            diagnostics: bundle.diagnostics,
            results,
            run_dir,
        })
    }

    /// Re-execute a sealed run's task specs as a dry run against the vault
    /// roots and config it was journaled with.
    pub fn replay(&self, run_id: &str) -> VaultResult<Vec<TaskResult>> {
        let record = self.journal.load(run_id)?;
        if !record.is_sealed() {
            return Err(JournalError::RunNotSealed {
                run_id: run_id.to_string(),
            }
            .into());
        }

        let mut config: VaultConfig = serde_json::from_value(record.context.config_snapshot)?;
        config.vault.vault_roots = record.context.vault_roots;
        let resolver = Arc::new(PointerResolver::new(
            self.store.clone(),
            ReplicaLocator::from_config(&config),
            config.resolver.clone(),
        ));
        let executor = TaskExecutor::new(self.store.clone(), resolver, &config);

        info!(run_id = %run_id, tasks = record.task_specs.len(), "replaying run");
        Ok(record
            .task_specs
            .into_iter()
            .map(|spec| executor.execute(&spec.with_mode(ExecutionMode::DryRun)))
            .collect())
    }

    /// Apply a manifest patch plan outside a pipeline run.
    pub fn sync_manifest(&self, plan: &PatchPlan, force: bool) -> VaultResult<usize> {
        apply_plan(&self.store, plan, force).map(|landed| landed.len())
    }

    fn track(&self, bundle: &EvidenceBundle) {
        let mut tracker = self.tracker();
        for reference in bundle.evidence.iter().filter(|r| r.degraded) {
            let fallback = bundle
                .diagnostics
                .repair_tasks
                .iter()
                .find(|t| t.subject_logical_id == reference.logical_id)
                .map(|t| t.task_id.clone())
                .unwrap_or_else(|| "none".to_string());
            tracker.record(DegradationEvent {
                component: reference.logical_id.to_string(),
                failure: reference.outcome.label().to_string(),
                fallback_used: fallback,
                timestamp: Utc::now(),
            });
        }
    }

    /// Record what an applied repair changed.
    fn land(&self, spec: &TaskSpec, result: &TaskResult, writer: &mut RunDirWriter) -> VaultResult<()> {
        if result.status != TaskStatus::Ok || result.mutations.is_empty() {
            return Ok(());
        }
        if let Some(subject) = spec.subject() {
            self.tracker().mark_recovered(&subject.to_string());
        }
        for record in result
            .mutations
            .iter()
            .filter(|r| r.logical_id.kind() == VaultKind::Mu)
        {
            writer.write_json(
                &format!(
                    "{}/{}",
                    run_dir::FIXED_MU_DIR,
                    run_dir::fixed_mu_name(&record.logical_id)
                ),
                record,
            )?;
        }
        Ok(())
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn classify(bundle: &EvidenceBundle, results: &[TaskResult], blocked_plans: usize) -> PipelineStatus {
    if blocked_plans > 0 || results.iter().any(|r| r.is_failed()) {
        return PipelineStatus::Degraded;
    }
    let landed = results.iter().any(|r| !r.mutations.is_empty());
    let proposed = results.iter().any(|r| r.proposal.is_some() && r.mutations.is_empty());
    match (landed, proposed) {
        (true, false) => PipelineStatus::Repaired,
        (_, true) => PipelineStatus::Proposed,
        (false, false) if bundle.diagnostics.evidence_degraded => PipelineStatus::Degraded,
        (false, false) => PipelineStatus::Clean,
    }
}
