//! Keyed mutual exclusion. Keys are locked in sorted order so two writers
//! touching overlapping identifiers cannot deadlock. A key's entry lives
//! only while someone holds or waits on it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` holding the locks of every key in `keys`.
    pub fn with_locked<S, R>(&self, keys: &[S], f: impl FnOnce() -> R) -> R
    where
        S: AsRef<str>,
    {
        let keys = sorted_keys(keys);
        let handles = self.handles(&keys);
        let result = {
            let _guards = lock_all(&handles);
            f()
        };
        drop(handles);
        self.release(&keys);
        result
    }

    /// Keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn handles(&self, keys: &[&str]) -> Vec<Arc<Mutex<()>>> {
        keys.iter()
            .map(|key| {
                self.locks
                    .entry((*key).to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            })
            .collect()
    }

    /// Drop entries no other caller holds a handle to. Handles are cloned
    /// under the shard lock, so a count of one cannot race a new waiter.
    fn release(&self, keys: &[&str]) {
        for key in keys {
            self.locks
                .remove_if(*key, |_, handle| Arc::strong_count(handle) == 1);
        }
    }
}

fn sorted_keys<S: AsRef<str>>(keys: &[S]) -> Vec<&str> {
    let mut keys: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// A poisoned lock is still a valid lock: the ledger state it guards lives
/// elsewhere.
fn lock_all(handles: &[Arc<Mutex<()>>]) -> Vec<MutexGuard<'_, ()>> {
    handles
        .iter()
        .map(|h| h.lock().unwrap_or_else(PoisonError::into_inner))
        .collect()
}
