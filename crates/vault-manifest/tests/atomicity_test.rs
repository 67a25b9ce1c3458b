//! Crash and fault injection: a supersession is either fully visible or
//! not at all, and failed writes never leave partial lines behind.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use test_fixtures::{record, uri, TempVault};
use vault_core::config::ManifestConfig;
use vault_core::errors::{ManifestError, VaultError};
use vault_core::hashing;
use vault_core::models::{ManifestRecord, VaultKind};
use vault_core::traits::{IManifestStore, SupersedeTarget};
use vault_manifest::ledger::encode_line;
use vault_manifest::{FileSink, LineSink, ManifestStore};

/// Writes half of each line, then fails, for the first `failures` appends.
struct FlakySink {
    failures: AtomicU32,
    calls: Arc<AtomicU32>,
}

impl LineSink for FlakySink {
    fn len(&self, path: &Path) -> io::Result<u64> {
        FileSink.len(path)
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            FileSink.append(path, &bytes[..bytes.len() / 2])?;
            return Err(io::Error::new(io::ErrorKind::Other, "injected"));
        }
        FileSink.append(path, bytes)
    }

    fn truncate(&self, path: &Path, len: u64) -> io::Result<()> {
        FileSink.truncate(path, len)
    }
}

/// Tears the first append in half and refuses the rollback after it.
struct StuckRollbackSink {
    tear_next: AtomicBool,
    refuse_truncate: AtomicBool,
}

impl LineSink for StuckRollbackSink {
    fn len(&self, path: &Path) -> io::Result<u64> {
        FileSink.len(path)
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.tear_next.swap(false, Ordering::SeqCst) {
            FileSink.append(path, &bytes[..bytes.len() / 2])?;
            return Err(io::Error::new(io::ErrorKind::Other, "disk hiccup"));
        }
        FileSink.append(path, bytes)
    }

    fn truncate(&self, path: &Path, len: u64) -> io::Result<()> {
        if self.refuse_truncate.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "truncate hiccup"));
        }
        FileSink.truncate(path, len)
    }
}

fn config() -> ManifestConfig {
    ManifestConfig {
        manifests_dir: None,
        write_retries: 3,
        retry_backoff_ms: 0,
    }
}

#[test]
fn crash_mid_supersede_leaves_fully_old_or_fully_new_state() {
    let vault = TempVault::new();
    let dir = vault.manifests_dir();
    let id = uri("vault://default/mu/x.mimo");

    let old = {
        let store = ManifestStore::open(&dir, config()).unwrap();
        store
            .append(VaultKind::Mu, record("vault://default/mu/x.mimo", "mu/x.mimo", b"old"))
            .unwrap()
    };
    let manifest = dir.join("mu_manifest.jsonl");
    let clean = std::fs::read(&manifest).unwrap();

    let mut replacement = record("vault://default/mu/x.mimo", "mu/y.mimo", b"old");
    replacement.supersedes = vec![old.record_id];
    let line = encode_line(&replacement).unwrap();

    for cut in 0..=line.len() {
        let mut bytes = clean.clone();
        bytes.extend_from_slice(&line[..cut]);
        std::fs::write(&manifest, &bytes).unwrap();

        let store = ManifestStore::open(&dir, config()).unwrap();
        let current = store.lookup(&id).unwrap();
        assert_eq!(current.len(), 1, "cut at {cut}");
        if cut == line.len() {
            assert_eq!(current[0].record_id, replacement.record_id);
            assert_eq!(store.history(&id).unwrap()[0].superseded_by, Some(id.clone()));
        } else {
            assert_eq!(current[0].record_id, old.record_id, "cut at {cut}");
            assert_eq!(store.history(&id).unwrap().len(), 1);
            assert_eq!(std::fs::read(&manifest).unwrap(), clean, "torn tail trimmed");
        }
    }
}

#[test]
fn failed_attempts_are_rolled_back_before_retry() {
    let vault = TempVault::new();
    let calls = Arc::new(AtomicU32::new(0));
    let sink = FlakySink {
        failures: AtomicU32::new(2),
        calls: Arc::clone(&calls),
    };
    let store =
        ManifestStore::open_with_sink(vault.manifests_dir(), config(), Box::new(sink)).unwrap();
    let r = store
        .append(VaultKind::Raw, record("vault://default/raw/a", "raw/a", b"a"))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let bytes = std::fs::read(store.kind_path(VaultKind::Raw)).unwrap();
    assert_eq!(bytes, encode_line(&r).unwrap());
}

#[test]
fn exhausted_retries_surface_write_failed_and_change_nothing() {
    let vault = TempVault::new();
    let dir = vault.manifests_dir();
    let id = uri("vault://default/raw/a");
    let old = ManifestStore::open(&dir, config())
        .unwrap()
        .append(VaultKind::Raw, record("vault://default/raw/a", "raw/a", b"a"))
        .unwrap();
    let before = std::fs::read(dir.join("raw_manifest.jsonl")).unwrap();

    let sink = FlakySink {
        failures: AtomicU32::new(10),
        calls: Arc::new(AtomicU32::new(0)),
    };
    let store = ManifestStore::open_with_sink(&dir, config(), Box::new(sink)).unwrap();
    let err = store
        .supersede(
            SupersedeTarget::Logical(id.clone()),
            record("vault://default/raw/a", "raw/b", b"a"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        VaultError::ManifestError(ManifestError::WriteFailed { attempts: 3, .. })
    ));

    assert_eq!(store.lookup(&id).unwrap(), vec![old.clone()]);
    assert_eq!(std::fs::read(dir.join("raw_manifest.jsonl")).unwrap(), before);

    let reopened = ManifestStore::open(&dir, config()).unwrap();
    assert_eq!(reopened.lookup(&id).unwrap(), vec![old]);
}

#[test]
fn abandoned_write_is_trimmed_before_the_next_append() {
    let vault = TempVault::new();
    let dir = vault.manifests_dir();
    let sink = StuckRollbackSink {
        tear_next: AtomicBool::new(true),
        refuse_truncate: AtomicBool::new(true),
    };
    let store = ManifestStore::open_with_sink(&dir, config(), Box::new(sink)).unwrap();

    let err = store
        .append(VaultKind::Raw, record("vault://default/raw/a", "raw/a", b"a"))
        .unwrap_err();
    assert!(matches!(
        err,
        VaultError::ManifestError(ManifestError::WriteFailed { attempts: 1, .. })
    ));
    assert!(std::fs::metadata(store.kind_path(VaultKind::Raw)).unwrap().len() > 0);

    let b = store
        .append(VaultKind::Raw, record("vault://default/raw/b", "raw/b", b"b"))
        .unwrap();
    assert_eq!(
        std::fs::read(store.kind_path(VaultKind::Raw)).unwrap(),
        encode_line(&b).unwrap()
    );

    let reopened = ManifestStore::open(&dir, config()).unwrap();
    assert_eq!(reopened.lookup(&uri("vault://default/raw/b")).unwrap(), vec![b]);
    assert!(reopened.lookup(&uri("vault://default/raw/a")).unwrap().is_empty());
}

#[test]
fn concurrent_appends_reload_in_the_order_they_were_served() {
    let vault = TempVault::new();
    let dir = vault.manifests_dir();
    let store = Arc::new(ManifestStore::open(&dir, config()).unwrap());

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    let id = format!("vault://default/raw/{t}/{i}");
                    let rel = format!("raw/{t}/{i}");
                    store
                        .append(VaultKind::Raw, record(&id, &rel, b"shared"))
                        .unwrap();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }

    let ids = |records: Vec<ManifestRecord>| -> Vec<_> {
        records.into_iter().map(|r| r.record_id).collect()
    };
    let digest = hashing::hash(b"shared");
    let served = ids(store.records(VaultKind::Raw).unwrap());
    let served_by_hash = ids(store.find_by_hash(&digest).unwrap());
    assert_eq!(served.len(), 200);

    let reopened = ManifestStore::open(&dir, config()).unwrap();
    assert_eq!(ids(reopened.records(VaultKind::Raw).unwrap()), served);
    assert_eq!(ids(reopened.find_by_hash(&digest).unwrap()), served_by_hash);
}
