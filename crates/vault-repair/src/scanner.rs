//! Deterministic rescans of vault roots for content with a given digest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use vault_core::config::RepairConfig;
use vault_core::hashing::{self, ContentHash};

/// A file whose content hashes to the wanted digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub vault_id: String,
    pub path: PathBuf,
    pub size: u64,
}

enum Step {
    Found(Candidate),
    Exhausted,
    LimitReached,
}

pub struct CandidateScanner {
    roots: BTreeMap<String, PathBuf>,
    config: RepairConfig,
}

impl CandidateScanner {
    pub fn new(roots: BTreeMap<String, PathBuf>, config: RepairConfig) -> Self {
        Self { roots, config }
    }

    /// Walk roots (preferred vault first, then by vault id) in sorted file
    /// order and return the first file hashing to `want`.
    ///
    /// `start`, when it is a directory under one of the roots, is searched
    /// before anything else and not walked again afterwards. `size_hint`
    /// skips files of the wrong length without hashing them. At most
    /// `max_scan_files` files are hashed per call.
    pub fn find(
        &self,
        want: &ContentHash,
        size_hint: Option<u64>,
        preferred_vault: &str,
        start: Option<&Path>,
    ) -> Option<Candidate> {
        let mut order: Vec<(&String, &PathBuf)> = self.roots.iter().collect();
        order.sort_by_key(|(id, _)| id.as_str() != preferred_vault);

        let start = start.filter(|dir| dir.is_dir()).and_then(|dir| {
            self.roots
                .iter()
                .find(|(_, root)| dir.starts_with(root))
                .map(|(id, _)| (id.as_str(), dir))
        });

        let mut hashed = 0usize;
        if let Some((vault_id, dir)) = start {
            match self.walk(dir, vault_id, want, size_hint, None, &mut hashed) {
                Step::Found(candidate) => return Some(candidate),
                Step::LimitReached => return None,
                Step::Exhausted => {}
            }
        }
        let skip = start.map(|(_, dir)| dir);
        for (vault_id, root) in order {
            match self.walk(root, vault_id, want, size_hint, skip, &mut hashed) {
                Step::Found(candidate) => return Some(candidate),
                Step::LimitReached => return None,
                Step::Exhausted => {}
            }
        }
        debug!(want = %want, hashed, "no candidate found");
        None
    }

    fn walk(
        &self,
        dir: &Path,
        vault_id: &str,
        want: &ContentHash,
        size_hint: Option<u64>,
        skip: Option<&Path>,
        hashed: &mut usize,
    ) -> Step {
        let walker = WalkDir::new(dir)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.skipped(e) && skip.map_or(true, |s| e.path() != s));

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_file() || is_temp_file(entry.path()) {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if size_hint.is_some_and(|size| size != meta.len()) {
                continue;
            }
            if *hashed >= self.config.max_scan_files {
                warn!(
                    limit = self.config.max_scan_files,
                    want = %want,
                    "candidate scan limit reached"
                );
                return Step::LimitReached;
            }
            *hashed += 1;

            match hashing::hash_file(entry.path()) {
                Ok((digest, size)) if &digest == want => {
                    debug!(path = %entry.path().display(), hashed = *hashed, "candidate found");
                    return Step::Found(Candidate {
                        vault_id: vault_id.to_string(),
                        path: entry.path().to_path_buf(),
                        size,
                    });
                }
                Ok(_) => {}
                Err(e) => debug!(path = %entry.path().display(), error = %e, "unreadable during scan"),
            }
        }
        Step::Exhausted
    }

    fn skipped(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.config.skip_dirs.iter().any(|s| s == name))
    }
}

/// Hidden files and in-flight writes are never candidates.
fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.starts_with('.') || name.ends_with(".tmp") || name.ends_with(".partial")
        })
}
