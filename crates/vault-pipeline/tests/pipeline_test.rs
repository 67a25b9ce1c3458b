//! End-to-end runs: evidence, repair, journal, run directory, replay.

use std::sync::Arc;

use test_fixtures::{uri, TempVault};
use vault_core::errors::{JournalError, VaultError};
use vault_core::models::{
    ExecutionMode, FailureReason, Pointer, RunContext, TaskStatus, VaultKind,
};
use vault_core::traits::{IManifestStore, IRunJournal};
use vault_journal::InMemoryJournal;
use vault_manifest::ManifestStore;
use vault_observability::RecoveryStatus;
use vault_pipeline::run_dir::{RunManifest, RUN_MANIFEST_FILE};
use vault_pipeline::{PipelineInput, PipelineStatus, RepairPipeline};

fn pipeline(vault: &TempVault) -> RepairPipeline {
    let store = Arc::new(ManifestStore::from_config(vault.config()).unwrap());
    RepairPipeline::new(
        vault.config().clone(),
        store,
        Arc::new(InMemoryJournal::new()),
    )
}

fn seed(p: &RepairPipeline, vault: &TempVault, id: &str, rel: &str, bytes: &[u8]) {
    let record = vault.ingest(id, rel, bytes);
    p.store().append(uri(id).kind(), record).unwrap();
}

fn cite(id: &str) -> Pointer {
    Pointer::new(uri(id))
}

#[test]
fn clean_run_is_sealed_and_published() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    seed(&p, &vault, "vault://default/mu/a.mimo", "mu/a.mimo", b"fine");

    let report = p.run(&[cite("vault://default/mu/a.mimo")], ExecutionMode::DryRun).unwrap();

    assert_eq!(report.status, PipelineStatus::Clean);
    assert!(report.results.is_empty());
    assert!(!report.diagnostics.evidence_degraded);
    assert_eq!(report.run_dir, vault.config().pipeline.runs_root.join(&report.run_id));
    assert!(report.run_dir.join(RUN_MANIFEST_FILE).is_file());
    assert!(report.run_dir.join("patch_plans").is_dir());
    assert!(report.run_dir.join("task_results").is_dir());
    assert!(report.run_dir.join("fixed_mu").is_dir());
    assert!(p.journal().load(&report.run_id).unwrap().is_sealed());
    assert!(p.journal().unsealed_runs().unwrap().is_empty());
}

#[test]
fn dry_run_proposes_then_apply_repairs() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    seed(&p, &vault, "vault://default/mu/note.mimo", "mu/note.mimo", b"a memory unit");
    vault.rename("mu/note.mimo", "mu/archive/note.mimo");
    let citations = [cite("vault://default/mu/note.mimo")];

    let dry = p.run(&citations, ExecutionMode::DryRun).unwrap();
    assert_eq!(dry.status, PipelineStatus::Proposed);
    assert_eq!(dry.results.len(), 1);
    assert!(dry.results[0].mutations.is_empty());
    assert_eq!(
        p.store().history(&uri("vault://default/mu/note.mimo")).unwrap().len(),
        1
    );

    let applied = p.run(&citations, ExecutionMode::Apply).unwrap();
    assert_eq!(applied.status, PipelineStatus::Repaired);
    assert_eq!(applied.results[0].proposal, dry.results[0].proposal);
    assert!(applied
        .run_dir
        .join("fixed_mu/default__note.mimo.json")
        .is_file());
    assert!(applied
        .run_dir
        .join(format!("task_results/{}.json", applied.results[0].task_id))
        .is_file());

    let recovered = p.degradations();
    assert_eq!(recovered.len(), 2);
    assert!(recovered
        .iter()
        .all(|d| d.recovery_status == RecoveryStatus::Recovered));

    let after = p.run(&citations, ExecutionMode::DryRun).unwrap();
    assert_eq!(after.status, PipelineStatus::Clean);
}

#[test]
fn lost_content_degrades_and_is_journaled() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    seed(&p, &vault, "vault://default/raw/gone", "raw/gone", b"only copy");
    vault.remove("raw/gone");

    let report = p.run(&[cite("vault://default/raw/gone")], ExecutionMode::Apply).unwrap();

    assert_eq!(report.status, PipelineStatus::Degraded);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(
        report.results[0].failure,
        Some(FailureReason::NoCandidateReplica)
    );
    assert_eq!(
        p.store().history(&uri("vault://default/raw/gone")).unwrap().len(),
        1
    );

    let failed = p.journal().query_tasks(Some(TaskStatus::Failed), 10).unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, report.run_id);
    let summary = &p.journal().list_runs().unwrap()[0];
    assert_eq!(summary.failed_count, 1);
    assert!(summary.completed_at.is_some());
}

#[test]
fn run_manifest_indexes_every_output() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    seed(&p, &vault, "vault://default/mu/m.mimo", "mu/m.mimo", b"unit");
    vault.rename("mu/m.mimo", "mu/moved.mimo");

    let report = p.run(&[cite("vault://default/mu/m.mimo")], ExecutionMode::Apply).unwrap();

    let manifest: RunManifest = serde_json::from_slice(
        &std::fs::read(report.run_dir.join(RUN_MANIFEST_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest.run_id, report.run_id);
    assert_eq!(manifest.status, PipelineStatus::Repaired);
    assert_eq!(manifest.citations, vec![cite("vault://default/mu/m.mimo")]);
    assert_eq!(manifest.outputs.len(), 2);
    for output in &manifest.outputs {
        let bytes = std::fs::read(report.run_dir.join(&output.path)).unwrap();
        assert_eq!(output.content_hash, vault_core::hashing::hash(&bytes));
    }
}

#[test]
fn replay_re_executes_sealed_run_as_dry_run() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    seed(&p, &vault, "vault://default/raw/r", "raw/r", b"replayable");
    vault.rename("raw/r", "raw/moved/r");

    let report = p.run(&[cite("vault://default/raw/r")], ExecutionMode::DryRun).unwrap();
    let replayed = p.replay(&report.run_id).unwrap();

    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].task_id, report.results[0].task_id);
    assert_eq!(replayed[0].proposal, report.results[0].proposal);
    assert!(replayed[0].mutations.is_empty());
}

#[test]
fn replay_refuses_unsealed_runs() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    let run_id = p.journal().begin(RunContext::default()).unwrap();

    let err = p.replay(&run_id).unwrap_err();

    assert!(matches!(
        err,
        VaultError::JournalError(JournalError::RunNotSealed { .. })
    ));
}

#[test]
fn incoming_manifest_is_planned_and_applied() {
    let vault = TempVault::new();
    let p = pipeline(&vault);
    let incoming_record = vault.ingest("vault://default/mu/peer.mimo", "mu/peer.mimo", b"from peer");
    let incoming = vault.tmp().join("peer_mu_manifest.jsonl");
    std::fs::write(
        &incoming,
        format!("{}\n", serde_json::to_string(&incoming_record).unwrap()),
    )
    .unwrap();

    let input = PipelineInput::new(Vec::new()).with_incoming(VaultKind::Mu, &incoming);
    let dry = p.run_input(&input, ExecutionMode::DryRun).unwrap();
    assert!(dry.run_dir.join("patch_plans/000_mu.json").is_file());
    assert!(p
        .store()
        .lookup(&uri("vault://default/mu/peer.mimo"))
        .unwrap()
        .is_empty());

    p.run_input(&input, ExecutionMode::Apply).unwrap();
    let current = p.store().lookup(&uri("vault://default/mu/peer.mimo")).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].record_id, incoming_record.record_id);
}

#[test]
fn open_uses_the_configured_sqlite_journal() {
    let vault = TempVault::new();
    let p = RepairPipeline::open(vault.config().clone()).unwrap();

    let report = p.run(&[], ExecutionMode::DryRun).unwrap();

    assert!(vault.config().journal_path().is_file());
    assert_eq!(p.journal().list_runs().unwrap()[0].run_id, report.run_id);
}
