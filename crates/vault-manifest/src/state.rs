//! In-memory view of every manifest, rebuilt from disk on open.

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use vault_core::hashing::ContentHash;
use vault_core::models::{ManifestRecord, VaultKind, VaultUri};

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub record: ManifestRecord,
    /// Manifest file the record lives in.
    pub kind: VaultKind,
}

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    entries: Vec<Entry>,
    by_logical: HashMap<VaultUri, Vec<usize>>,
    by_id: HashMap<Uuid, usize>,
    current: usize,
}

impl LedgerState {
    /// Add a record without linking its `supersedes` list.
    pub fn push(&mut self, kind: VaultKind, record: ManifestRecord) -> usize {
        let idx = self.entries.len();
        self.by_logical
            .entry(record.logical_id.clone())
            .or_default()
            .push(idx);
        self.by_id.insert(record.record_id, idx);
        if record.is_current() {
            self.current += 1;
        }
        self.entries.push(Entry { record, kind });
        idx
    }

    /// Derive `superseded_by` on every record the entry at `idx` replaces.
    pub fn link(&mut self, idx: usize) {
        let successor = self.entries[idx].record.logical_id.clone();
        let replaced = self.entries[idx].record.supersedes.clone();
        for id in replaced {
            match self.by_id.get(&id).copied() {
                Some(old) if old != idx => {
                    let record = &mut self.entries[old].record;
                    if record.superseded_by.is_none() {
                        record.superseded_by = Some(successor.clone());
                        self.current -= 1;
                    }
                }
                _ => warn!(record_id = %id, "supersedes unknown record"),
            }
        }
    }

    pub fn insert(&mut self, kind: VaultKind, record: ManifestRecord) {
        let idx = self.push(kind, record);
        self.link(idx);
    }

    pub fn link_all(&mut self) {
        for idx in 0..self.entries.len() {
            if !self.entries[idx].record.supersedes.is_empty() {
                self.link(idx);
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Entry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    /// Current entries, newest first.
    pub fn current(&self, logical_id: &VaultUri) -> Vec<&Entry> {
        self.by_logical
            .get(logical_id)
            .map(|idxs| {
                idxs.iter()
                    .rev()
                    .map(|&i| &self.entries[i])
                    .filter(|e| e.record.is_current())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn history(&self, logical_id: &VaultUri) -> Vec<ManifestRecord> {
        self.by_logical
            .get(logical_id)
            .map(|idxs| idxs.iter().map(|&i| self.entries[i].record.clone()).collect())
            .unwrap_or_default()
    }

    /// Manifest file an identifier's records already live in.
    pub fn placement(&self, logical_id: &VaultUri) -> Option<VaultKind> {
        self.by_logical
            .get(logical_id)
            .and_then(|idxs| idxs.first())
            .map(|&i| self.entries[i].kind)
    }

    pub fn records_of_kind(&self, kind: VaultKind) -> Vec<ManifestRecord> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.record.clone())
            .collect()
    }

    pub fn find_by_hash(&self, hash: &ContentHash) -> Vec<ManifestRecord> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.record.is_current() && &e.record.content_hash == hash)
            .map(|e| e.record.clone())
            .collect()
    }

    pub fn current_count(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
