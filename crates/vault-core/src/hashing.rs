//! Content addresser: blake3 digests of raw bytes, rendered as `blake3:<hex>`.
//!
//! Every layer that claims "this content is what it says it is" goes through
//! [`hash`] and [`verify`]. Neither function has side effects.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{HASH_ALGORITHM, HASH_CHUNK_SIZE};

/// Hex length of a blake3 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A strong content digest, always rendered with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a rendered digest (`blake3:<64 lowercase hex>`).
    pub fn parse(s: &str) -> Result<Self, String> {
        let (algo, hex) = s
            .split_once(':')
            .ok_or_else(|| format!("content hash missing algorithm tag: {s:?}"))?;
        if algo != HASH_ALGORITHM {
            return Err(format!("unsupported hash algorithm {algo:?} in {s:?}"));
        }
        if hex.len() != DIGEST_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("malformed digest in {s:?}"));
        }
        Ok(Self(format!("{HASH_ALGORITHM}:{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex part without the algorithm tag.
    pub fn hex(&self) -> &str {
        &self.0[HASH_ALGORITHM.len() + 1..]
    }

    fn from_blake3(hash: blake3::Hash) -> Self {
        Self(format!("{HASH_ALGORITHM}:{}", hash.to_hex()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(value: ContentHash) -> Self {
        value.0
    }
}

/// Hash a byte slice.
pub fn hash(bytes: &[u8]) -> ContentHash {
    ContentHash::from_blake3(blake3::hash(bytes))
}

/// True iff `bytes` hash to `digest`.
pub fn verify(digest: &ContentHash, bytes: &[u8]) -> bool {
    hash(bytes) == *digest
}

/// Stream a reader through the hasher. Returns the digest and the byte count.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<(ContentHash, u64)> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((ContentHash::from_blake3(hasher.finalize()), total))
}

/// Hash the file at `path` without loading it whole.
pub fn hash_file(path: &std::path::Path) -> std::io::Result<(ContentHash, u64)> {
    let file = std::fs::File::open(path)?;
    hash_reader(std::io::BufReader::new(file))
}

/// Short deterministic key over `|`-joined parts, used for idempotency keys.
pub fn key_of(parts: &[&str]) -> ContentHash {
    hash(parts.join("|").as_bytes())
}
