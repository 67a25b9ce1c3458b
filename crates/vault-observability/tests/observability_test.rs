use chrono::Utc;
use vault_core::config::ObservabilityConfig;
use vault_core::models::DegradationEvent;
use vault_observability::tracing_setup;
use vault_observability::{DegradationTracker, RecoveryStatus};

fn event(component: &str) -> DegradationEvent {
    DegradationEvent {
        component: component.to_string(),
        failure: "hash_mismatch".to_string(),
        fallback_used: "REPAIR_POINTER".to_string(),
        timestamp: Utc::now(),
    }
}

#[test]
fn init_is_idempotent() {
    let config = ObservabilityConfig::default();
    tracing_setup::init(&config);
    tracing_setup::init(&config);
    let span = vault_observability::pipeline_span!("RUN-1");
    let _enter = span.enter();
    tracing::info!("inside span");
}

#[test]
fn tracker_records_and_recovers() {
    let mut tracker = DegradationTracker::new();
    tracker.record(event("vault://default/mu/a"));
    tracker.record(event("vault://default/mu/a"));
    tracker.record(event("vault://default/raw/b"));
    assert_eq!(tracker.active_degradations().len(), 3);
    assert_eq!(tracker.count_recent("vault://default/mu/a", 60), 2);

    assert_eq!(tracker.mark_recovered("vault://default/mu/a"), 2);
    let active = tracker.active_degradations();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].event.component, "vault://default/raw/b");
    assert!(tracker
        .events()
        .iter()
        .filter(|t| t.recovery_status == RecoveryStatus::Recovered)
        .all(|t| t.recovered_at.is_some()));
}

#[test]
fn tracked_degradation_serializes() {
    let mut tracker = DegradationTracker::new();
    tracker.record(event("vault://default/mu/a"));
    let json = serde_json::to_value(&tracker.events()[0]).unwrap();
    assert_eq!(json["recovery_status"], "active");
    assert_eq!(json["event"]["failure"], "hash_mismatch");
}
