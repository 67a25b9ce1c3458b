//! Default values for every config section.

pub const DEFAULT_MANIFEST_WRITE_RETRIES: u32 = 3;
pub const DEFAULT_MANIFEST_RETRY_BACKOFF_MS: u64 = 25;

pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_READ_RETRIES: u32 = 2;
pub const DEFAULT_READ_RETRY_BACKOFF_MS: u64 = 20;

pub const DEFAULT_MAX_SCAN_FILES: usize = 100_000;

pub const DEFAULT_SNIPPET_MAX_CHARS: usize = 280;

pub const DEFAULT_RUNS_ROOT: &str = "runs/repair";
pub const DEFAULT_JOURNAL_FILE: &str = "journal.sqlite";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directory names never descended into while rescanning vault roots.
pub fn default_skip_dirs() -> Vec<String> {
    vec!["manifests".to_string(), "logs".to_string(), ".git".to_string()]
}
