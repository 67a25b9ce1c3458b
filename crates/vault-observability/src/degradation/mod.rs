//! Degradation tracking for citations observed during a pipeline run.

pub mod tracker;

pub use tracker::{DegradationTracker, RecoveryStatus, TrackedDegradation};
