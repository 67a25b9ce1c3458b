use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

use vault_core::errors::{ManifestError, VaultResult};

use super::LineSink;

/// Append one complete line after `committed`, the end of the last whole
/// line, with bounded retries. Returns the new committed length.
///
/// Bytes past `committed` left by an earlier abandoned write are cut before
/// writing, and every failed attempt is cut back before the next one. If the
/// cut after a failed attempt fails, the write is abandoned at once; the
/// next append or open trims the leftover bytes.
pub fn append_line(
    sink: &dyn LineSink,
    path: &Path,
    committed: u64,
    line: &[u8],
    attempts: u32,
    backoff_ms: u64,
) -> VaultResult<u64> {
    let attempts = attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        if let Err(e) = trim_to(sink, path, committed) {
            last_error = e.to_string();
            warn!(path = %path.display(), attempt, error = %e, "manifest trim failed");
            backoff(backoff_ms, attempt, attempts);
            continue;
        }

        match sink.append(path, line) {
            Ok(()) => return Ok(committed + line.len() as u64),
            Err(e) => {
                last_error = e.to_string();
                warn!(path = %path.display(), attempt, error = %e, "manifest append failed");
                if let Err(te) = sink.truncate(path, committed) {
                    error!(
                        path = %path.display(),
                        error = %te,
                        "manifest rollback failed; abandoning write"
                    );
                    return Err(ManifestError::WriteFailed {
                        attempts: attempt,
                        reason: format!("{last_error}; rollback failed: {te}"),
                    }
                    .into());
                }
            }
        }
        backoff(backoff_ms, attempt, attempts);
    }

    Err(ManifestError::WriteFailed {
        attempts,
        reason: last_error,
    }
    .into())
}

/// Cut anything after `committed`. A file shorter than that lost committed
/// lines and must not be written to.
fn trim_to(sink: &dyn LineSink, path: &Path, committed: u64) -> io::Result<()> {
    let len = sink.len(path)?;
    if len > committed {
        warn!(
            path = %path.display(),
            dropped_bytes = len - committed,
            "discarding bytes past the last committed line"
        );
        sink.truncate(path, committed)?;
    } else if len < committed {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("manifest is {len} bytes, expected at least {committed}"),
        ));
    }
    Ok(())
}

fn backoff(base_ms: u64, attempt: u32, attempts: u32) {
    if attempt < attempts && base_ms > 0 {
        let factor = 1u64 << (attempt - 1).min(10);
        thread::sleep(Duration::from_millis(base_ms.saturating_mul(factor)));
    }
}
