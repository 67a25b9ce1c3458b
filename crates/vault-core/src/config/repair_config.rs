use serde::{Deserialize, Serialize};

use super::defaults;

/// Candidate rescanning bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Files hashed at most per scan.
    pub max_scan_files: usize,
    pub follow_symlinks: bool,
    /// Directory names skipped at any depth.
    pub skip_dirs: Vec<String>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_scan_files: defaults::DEFAULT_MAX_SCAN_FILES,
            follow_symlinks: false,
            skip_dirs: defaults::default_skip_dirs(),
        }
    }
}
