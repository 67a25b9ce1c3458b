use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Byte-level access to a manifest file. Swappable for fault injection.
pub trait LineSink: Send + Sync {
    /// Current length; zero when the file does not exist yet.
    fn len(&self, path: &Path) -> io::Result<u64>;

    /// Append `bytes` and flush them to stable storage.
    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Cut the file back to `len` bytes.
    fn truncate(&self, path: &Path, len: u64) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl LineSink for FileSink {
    fn len(&self, path: &Path) -> io::Result<u64> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(bytes)?;
        file.sync_data()
    }

    fn truncate(&self, path: &Path, len: u64) -> io::Result<()> {
        let file = match OpenOptions::new().write(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound && len == 0 => return Ok(()),
            Err(e) => return Err(e),
        };
        file.set_len(len)?;
        file.sync_data()
    }
}
