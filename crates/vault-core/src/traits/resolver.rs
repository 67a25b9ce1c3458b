use crate::models::{Pointer, PointerRange, ResolutionOutcome, VaultUri};

/// Maps a logical identifier to verified replica content.
pub trait IPointerResolver: Send + Sync {
    /// Never mutates the manifest; failures come back as outcomes.
    fn resolve(&self, logical_id: &VaultUri, range: Option<PointerRange>) -> ResolutionOutcome;

    /// Like `resolve`, also checking the digest the citation recorded.
    fn resolve_pointer(&self, pointer: &Pointer) -> ResolutionOutcome {
        let outcome = self.resolve(&pointer.logical_id, pointer.range);
        match (&outcome, &pointer.expected_hash) {
            (
                ResolutionOutcome::Resolved {
                    verified_hash,
                    replica_path,
                    ..
                },
                Some(expected),
            ) if verified_hash != expected => ResolutionOutcome::HashMismatch {
                expected: expected.clone(),
                actual: verified_hash.clone(),
                replica_path: replica_path.clone(),
            },
            _ => outcome,
        }
    }
}
