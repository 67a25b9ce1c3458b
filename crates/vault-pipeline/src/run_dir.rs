//! Run directory writer.
//!
//! A run is assembled under `<runs_root>/.<run_id>.partial/` and renamed to
//! `<runs_root>/<run_id>/` only once `run_manifest.json` is in place, so a
//! directory without the leading dot is always complete. Every file inside
//! is written to a temp name, fsynced, then renamed.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vault_core::errors::{VaultError, VaultResult};
use vault_core::hashing::{self, ContentHash};
use vault_core::models::{ExecutionMode, Pointer, VaultUri};

use crate::report::PipelineStatus;

pub const PATCH_PLANS_DIR: &str = "patch_plans";
pub const TASK_RESULTS_DIR: &str = "task_results";
pub const FIXED_MU_DIR: &str = "fixed_mu";
pub const RUN_MANIFEST_FILE: &str = "run_manifest.json";

/// One file written into the run directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Relative to the run directory, `/`-separated.
    pub path: String,
    pub content_hash: ContentHash,
    pub size: u64,
}

/// Index of a run directory: inputs, outputs and their digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub mode: ExecutionMode,
    pub status: PipelineStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub citations: Vec<Pointer>,
    #[serde(default)]
    pub incoming_manifests: Vec<PathBuf>,
    pub outputs: Vec<ArtifactEntry>,
}

pub struct RunDirWriter {
    partial: PathBuf,
    final_dir: PathBuf,
    outputs: Vec<ArtifactEntry>,
}

impl RunDirWriter {
    pub fn create(runs_root: &Path, run_id: &str) -> VaultResult<Self> {
        let partial = runs_root.join(format!(".{run_id}.partial"));
        for sub in [PATCH_PLANS_DIR, TASK_RESULTS_DIR, FIXED_MU_DIR] {
            let dir = partial.join(sub);
            std::fs::create_dir_all(&dir).map_err(|e| VaultError::io(&dir, e))?;
        }
        Ok(Self {
            partial,
            final_dir: runs_root.join(run_id),
            outputs: Vec::new(),
        })
    }

    pub fn partial_dir(&self) -> &Path {
        &self.partial
    }

    pub fn outputs(&self) -> &[ArtifactEntry] {
        &self.outputs
    }

    /// Serialize `value` as pretty JSON at `rel` and record its digest.
    pub fn write_json<T: Serialize>(&mut self, rel: &str, value: &T) -> VaultResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        write_atomic(&self.partial.join(rel), &bytes)?;
        self.outputs.push(ArtifactEntry {
            path: rel.to_string(),
            content_hash: hashing::hash(&bytes),
            size: bytes.len() as u64,
        });
        Ok(())
    }

    /// Write `run_manifest.json` with the recorded outputs, then publish
    /// the directory under its final name.
    pub fn finish(self, mut manifest: RunManifest) -> VaultResult<PathBuf> {
        manifest.outputs = self.outputs;
        let bytes = serde_json::to_vec_pretty(&manifest)?;
        write_atomic(&self.partial.join(RUN_MANIFEST_FILE), &bytes)?;
        std::fs::rename(&self.partial, &self.final_dir)
            .map_err(|e| VaultError::io(&self.final_dir, e))?;
        debug!(run_dir = %self.final_dir.display(), outputs = manifest.outputs.len(), "run directory published");
        Ok(self.final_dir)
    }
}

/// File name for a superseding `mu` record: the identifier with `/` folded.
pub fn fixed_mu_name(logical_id: &VaultUri) -> String {
    format!(
        "{}__{}.json",
        logical_id.vault_id(),
        logical_id.path().replace('/', "__")
    )
}

fn write_atomic(path: &Path, bytes: &[u8]) -> VaultResult<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{name}.tmp"));

    let mut file = File::create(&temp).map_err(|e| VaultError::io(&temp, e))?;
    file.write_all(bytes).map_err(|e| VaultError::io(&temp, e))?;
    file.sync_all().map_err(|e| VaultError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| VaultError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(run_id: &str) -> RunManifest {
        RunManifest {
            run_id: run_id.into(),
            mode: ExecutionMode::DryRun,
            status: PipelineStatus::Clean,
            started_at: Utc::now(),
            completed_at: Utc::now(),
            citations: Vec::new(),
            incoming_manifests: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[test]
    fn partial_dir_is_renamed_on_finish() {
        let root = tempfile::tempdir().unwrap();
        let mut writer = RunDirWriter::create(root.path(), "RUN-1").unwrap();
        assert!(writer.partial_dir().ends_with(".RUN-1.partial"));
        writer
            .write_json("task_results/t1.json", &serde_json::json!({"ok": true}))
            .unwrap();
        assert!(!root.path().join("RUN-1").exists());

        let dir = writer.finish(manifest("RUN-1")).unwrap();

        assert_eq!(dir, root.path().join("RUN-1"));
        assert!(!root.path().join(".RUN-1.partial").exists());
        let written: RunManifest =
            serde_json::from_slice(&std::fs::read(dir.join(RUN_MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(written.outputs.len(), 1);
        let bytes = std::fs::read(dir.join("task_results/t1.json")).unwrap();
        assert_eq!(written.outputs[0].content_hash, hashing::hash(&bytes));
        assert!(!dir.join("task_results/.t1.json.tmp").exists());
    }

    #[test]
    fn fixed_mu_names_are_flat() {
        let uri = VaultUri::parse("vault://default/mu/2026/a.mimo").unwrap();
        assert_eq!(fixed_mu_name(&uri), "default__2026__a.mimo.json");
    }
}
