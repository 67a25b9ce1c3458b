//! Bounded replica reads: every read has a deadline and a retry limit.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use vault_core::config::ResolverConfig;

#[derive(Debug)]
pub enum ReadError {
    /// The file does not exist.
    Missing,
    /// Every attempt hit the deadline.
    TimedOut,
    /// A non-transient I/O error, or retries exhausted.
    Io(io::Error),
}

/// Read a whole replica under the configured deadline and retry limit.
///
/// A timed-out read leaves its worker thread to finish on its own; the
/// caller never waits past the deadline.
pub fn read_bounded(path: &Path, config: &ResolverConfig) -> Result<Vec<u8>, ReadError> {
    let attempts = config.read_retries.saturating_add(1);
    let mut last = ReadError::TimedOut;

    for attempt in 1..=attempts {
        match read_once(path.to_path_buf(), config.read_timeout()) {
            Ok(bytes) => return Ok(bytes),
            Err(ReadError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ReadError::Missing)
            }
            Err(ReadError::Io(e)) if !is_transient(&e) => return Err(ReadError::Io(e)),
            Err(e) => {
                warn!(path = %path.display(), attempt, error = ?e, "replica read failed");
                last = e;
            }
        }
        if attempt < attempts && config.retry_backoff_ms > 0 {
            thread::sleep(Duration::from_millis(
                config.retry_backoff_ms.saturating_mul(u64::from(attempt)),
            ));
        }
    }
    debug!(path = %path.display(), attempts, "replica read gave up");
    Err(last)
}

fn read_once(path: PathBuf, timeout: Duration) -> Result<Vec<u8>, ReadError> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(std::fs::read(&path));
    });
    match rx.recv_timeout(timeout) {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(ReadError::Io(e)),
        Err(_) => Err(ReadError::TimedOut),
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
