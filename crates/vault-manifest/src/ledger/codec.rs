use std::path::Path;

use vault_core::errors::{ManifestError, VaultError, VaultResult};
use vault_core::models::ManifestRecord;

/// Records parsed from one manifest file.
#[derive(Debug, Default)]
pub struct ParsedLedger {
    pub records: Vec<ManifestRecord>,
    /// Length of the well-formed prefix when the final line was torn.
    pub torn_at: Option<u64>,
    /// Bytes after `torn_at`.
    pub torn_bytes: usize,
}

/// One record, newline-terminated. `superseded_by` is never persisted.
pub fn encode_line(record: &ManifestRecord) -> VaultResult<Vec<u8>> {
    let mut record = record.clone();
    record.superseded_by = None;
    let mut line = serde_json::to_vec(&record)?;
    line.push(b'\n');
    Ok(line)
}

/// Parse a manifest file's bytes.
///
/// A final segment without a terminating newline is a write that never
/// completed and is reported through `torn_at`. Any other unparsable line
/// is corruption.
pub fn parse_ledger(path: &Path, bytes: &[u8]) -> VaultResult<ParsedLedger> {
    let mut parsed = ParsedLedger::default();
    let complete_len = match bytes.iter().rposition(|b| *b == b'\n') {
        Some(pos) => pos + 1,
        None => 0,
    };
    if complete_len < bytes.len() {
        parsed.torn_at = Some(complete_len as u64);
        parsed.torn_bytes = bytes.len() - complete_len;
    }

    for (idx, line) in bytes[..complete_len].split(|b| *b == b'\n').enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let record: ManifestRecord =
            serde_json::from_slice(line).map_err(|e| ManifestError::Corrupt {
                path: path.display().to_string(),
                line: idx + 1,
                reason: e.to_string(),
            })?;
        parsed.records.push(record);
    }
    Ok(parsed)
}

/// Read and parse a manifest file; a missing file is an empty ledger.
pub fn read_ledger(path: &Path) -> VaultResult<ParsedLedger> {
    match std::fs::read(path) {
        Ok(bytes) => parse_ledger(path, &bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ParsedLedger::default()),
        Err(e) => Err(VaultError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::hashing;
    use vault_core::models::VaultUri;

    fn record() -> ManifestRecord {
        ManifestRecord::new(
            VaultUri::parse("vault://default/raw/a.txt").unwrap(),
            "raw/a.txt",
            hashing::hash(b"a"),
            1,
        )
    }

    #[test]
    fn torn_tail_is_reported_not_parsed() {
        let line = encode_line(&record()).unwrap();
        let mut bytes = line.clone();
        bytes.extend_from_slice(&line[..line.len() / 2]);
        let parsed = parse_ledger(Path::new("m.jsonl"), &bytes).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.torn_at, Some(line.len() as u64));
        assert_eq!(parsed.torn_bytes, line.len() / 2);
    }

    #[test]
    fn garbage_in_the_middle_is_corruption() {
        let line = encode_line(&record()).unwrap();
        let mut bytes = b"{not json\n".to_vec();
        bytes.extend_from_slice(&line);
        let err = parse_ledger(Path::new("m.jsonl"), &bytes).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let line = encode_line(&record()).unwrap();
        let mut bytes = b"\n  \n".to_vec();
        bytes.extend_from_slice(&line);
        let parsed = parse_ledger(Path::new("m.jsonl"), &bytes).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.torn_at.is_none());
    }

    #[test]
    fn superseded_by_is_not_persisted() {
        let mut r = record();
        r.superseded_by = Some(r.logical_id.clone());
        let line = encode_line(&r).unwrap();
        let back: ManifestRecord = serde_json::from_slice(&line).unwrap();
        assert!(back.superseded_by.is_none());
    }
}
