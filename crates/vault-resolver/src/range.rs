//! Range checks and slicing against verified replica bytes.

use vault_core::models::PointerRange;

/// The slice `range` selects, or `None` when it falls outside `bytes`.
///
/// Byte ranges are half-open. Line ranges are 1-indexed and inclusive and
/// keep each line's terminator, so slices are exact sub-spans of the replica.
pub fn slice(bytes: &[u8], range: PointerRange) -> Option<&[u8]> {
    match range {
        PointerRange::Bytes { start, end } => {
            let (start, end) = (usize::try_from(start).ok()?, usize::try_from(end).ok()?);
            if start > end || end > bytes.len() {
                return None;
            }
            Some(&bytes[start..end])
        }
        PointerRange::Lines { start, end } => {
            if start == 0 || end < start {
                return None;
            }
            let mut offsets = line_starts(bytes);
            let count = offsets.len() as u64;
            if end > count {
                return None;
            }
            offsets.push(bytes.len());
            let from = offsets[(start - 1) as usize];
            let to = offsets[end as usize];
            Some(&bytes[from..to])
        }
    }
}

/// Byte offset where each line begins. A trailing newline does not open a
/// new line; empty content has no lines.
fn line_starts(bytes: &[u8]) -> Vec<usize> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0];
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' && i + 1 < bytes.len() {
            starts.push(i + 1);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &[u8] = b"one\ntwo\nthree\n";

    #[test]
    fn byte_ranges_are_half_open() {
        assert_eq!(slice(TEXT, PointerRange::Bytes { start: 4, end: 7 }), Some(&b"two"[..]));
        assert_eq!(slice(TEXT, PointerRange::Bytes { start: 0, end: 0 }), Some(&b""[..]));
        assert_eq!(
            slice(TEXT, PointerRange::Bytes { start: 0, end: 14 }),
            Some(TEXT)
        );
        assert_eq!(slice(TEXT, PointerRange::Bytes { start: 0, end: 15 }), None);
        assert_eq!(slice(TEXT, PointerRange::Bytes { start: 5, end: 4 }), None);
    }

    #[test]
    fn line_ranges_are_one_indexed_inclusive() {
        assert_eq!(
            slice(TEXT, PointerRange::Lines { start: 2, end: 2 }),
            Some(&b"two\n"[..])
        );
        assert_eq!(
            slice(TEXT, PointerRange::Lines { start: 2, end: 3 }),
            Some(&b"two\nthree\n"[..])
        );
        assert_eq!(slice(TEXT, PointerRange::Lines { start: 3, end: 4 }), None);
        assert_eq!(slice(TEXT, PointerRange::Lines { start: 0, end: 1 }), None);
    }

    #[test]
    fn last_line_without_newline_counts() {
        assert_eq!(
            slice(b"a\nb", PointerRange::Lines { start: 2, end: 2 }),
            Some(&b"b"[..])
        );
        assert_eq!(slice(b"", PointerRange::Lines { start: 1, end: 1 }), None);
    }
}
