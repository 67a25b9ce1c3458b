use std::sync::Arc;

use test_fixtures::{uri, TempVault};
use vault_core::config::{EvidenceConfig, EvidenceDepth};
use vault_core::hashing;
use vault_core::models::{DegradationReason, Pointer, RepairTaskType, VaultKind};
use vault_core::traits::IManifestStore;
use vault_evidence::{emit, EvidenceAssembler};
use vault_manifest::ManifestStore;
use vault_resolver::PointerResolver;

fn assembler(vault: &TempVault, depth: EvidenceDepth) -> (Arc<ManifestStore>, EvidenceAssembler) {
    let store = Arc::new(ManifestStore::from_config(vault.config()).unwrap());
    let resolver = Arc::new(PointerResolver::from_config(store.clone(), vault.config()));
    let config = EvidenceConfig {
        depth,
        ..EvidenceConfig::default()
    };
    (store, EvidenceAssembler::new(resolver, config))
}

#[test]
fn one_failing_citation_degrades_the_bundle_with_one_task() {
    let vault = TempVault::new();
    let (store, assembler) = assembler(&vault, EvidenceDepth::Ids);
    store
        .append(VaultKind::Mu, vault.ingest("vault://default/mu/ok", "mu/ok", b"fine"))
        .unwrap();

    let bundle = assembler
        .assemble(&[
            Pointer::new(uri("vault://default/mu/ok")),
            Pointer::new(uri("vault://default/mu/gone")),
        ])
        .with_repair_tasks();

    assert_eq!(bundle.evidence.len(), 2);
    assert!(!bundle.evidence[0].degraded);
    assert!(bundle.evidence[1].degraded);
    assert!(bundle.diagnostics.evidence_degraded);
    assert_eq!(bundle.diagnostics.repair_tasks.len(), 1);

    let task = &bundle.diagnostics.repair_tasks[0];
    assert_eq!(task.task_type, RepairTaskType::RepairPointer);
    assert_eq!(task.subject_logical_id, uri("vault://default/mu/gone"));
    assert_eq!(task.reason, DegradationReason::NotFound);
}

#[test]
fn clean_bundle_has_no_tasks() {
    let vault = TempVault::new();
    let (store, assembler) = assembler(&vault, EvidenceDepth::Ids);
    store
        .append(VaultKind::Raw, vault.ingest("vault://default/raw/a", "raw/a", b"a"))
        .unwrap();
    let bundle = assembler
        .assemble(&[Pointer::new(uri("vault://default/raw/a"))])
        .with_repair_tasks();
    assert!(!bundle.diagnostics.evidence_degraded);
    assert!(bundle.diagnostics.repair_reasons.is_empty());
    assert!(bundle.diagnostics.repair_tasks.is_empty());
    assert!(bundle.evidence[0].snippet.is_none());
}

#[test]
fn repeated_failures_of_one_identifier_yield_one_reason() {
    let vault = TempVault::new();
    let (_store, assembler) = assembler(&vault, EvidenceDepth::Ids);
    let gone = Pointer::new(uri("vault://default/mu/gone"));
    let other = Pointer::new(uri("vault://default/mu/other"));
    let bundle = assembler.assemble(&[gone.clone(), other.clone(), gone]);

    let subjects: Vec<_> = bundle
        .diagnostics
        .repair_reasons
        .iter()
        .map(|r| r.logical_id.clone())
        .collect();
    assert_eq!(subjects, vec![uri("vault://default/mu/gone"), other.logical_id]);
    assert_eq!(bundle.evidence.len(), 3);
}

#[test]
fn emission_is_deterministic_and_idempotent() {
    let vault = TempVault::new();
    let (store, assembler) = assembler(&vault, EvidenceDepth::Ids);
    store
        .append(VaultKind::Raw, vault.ingest("vault://default/raw/a", "raw/a", b"a"))
        .unwrap();
    vault.write("raw/a", b"changed");

    let pointers = [
        Pointer::new(uri("vault://default/raw/a")),
        Pointer::new(uri("vault://default/raw/b")).with_expected_hash(hashing::hash(b"b")),
    ];
    let first = assembler.assemble(&pointers);
    let second = assembler.assemble(&pointers);

    let tasks = emit(&first.diagnostics);
    assert_eq!(tasks, emit(&first.diagnostics));
    assert_eq!(tasks, emit(&second.diagnostics));
    assert_eq!(tasks.len(), 2);
    assert_ne!(tasks[0].idempotency_key, tasks[1].idempotency_key);

    let hint = tasks[0].proposed_action.as_ref().unwrap();
    assert_eq!(hint.content_hash, Some(hashing::hash(b"a")));
    let hint = tasks[1].proposed_action.as_ref().unwrap();
    assert_eq!(hint.content_hash, Some(hashing::hash(b"b")));
}

#[test]
fn snippets_are_redacted_and_bounded() {
    let vault = TempVault::new();
    let (store, assembler) = assembler(&vault, EvidenceDepth::Snippets);
    let body = format!("contact ann@example.org   token: abc123 {}", "x".repeat(500));
    store
        .append(
            VaultKind::Raw,
            vault.ingest("vault://default/raw/note", "raw/note", body.as_bytes()),
        )
        .unwrap();

    let reference = assembler.cite(&Pointer::new(uri("vault://default/raw/note")));
    let snippet = reference.snippet.unwrap();
    assert!(snippet.starts_with("contact [email] token=[redacted] x"));
    assert_eq!(snippet.chars().count(), 280);
    assert!(reference.outcome.bytes().map_or(true, <[u8]>::is_empty));
}

#[test]
fn diagnostics_serialize_as_outward_contract() {
    let vault = TempVault::new();
    let (_store, assembler) = assembler(&vault, EvidenceDepth::Ids);
    let bundle = assembler
        .assemble(&[Pointer::new(uri("vault://default/mu/gone"))])
        .with_repair_tasks();
    let json = serde_json::to_value(&bundle.diagnostics).unwrap();
    assert_eq!(json["evidence_degraded"], true);
    assert_eq!(json["repair_tasks"][0]["type"], "REPAIR_POINTER");
    assert_eq!(json["repair_tasks"][0]["subject_logical_id"], "vault://default/mu/gone");
    assert_eq!(json["repair_tasks"][0]["reason"]["code"], "not_found");
}
