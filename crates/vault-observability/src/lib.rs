//! Structured logging for the vault: subscriber setup, per-operation spans,
//! state-change events, and the degradation tracker.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
