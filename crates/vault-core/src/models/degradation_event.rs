use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A degraded citation observed during a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationEvent {
    /// Logical identifier whose evidence degraded.
    pub component: String,
    /// Outcome label, e.g. `hash_mismatch`.
    pub failure: String,
    /// What the pipeline did about it, e.g. the emitted task id.
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}
