use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Fixed-length SHA-256 content fingerprint.
///
/// A `ContentDigest` is the hash of a blob's full byte sequence, recorded in
/// the ledger at registration time. Identical content always produces the
/// same digest, and any modification changes it — this is the integrity
/// signal the whole system rests on.
///
/// The canonical text form is lowercase 64-character hex. Parsing accepts
/// mixed case and normalizes, so comparisons are always exact byte equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap a pre-computed 32-byte hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Parse from a hex string. Accepts upper or lower case.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s.trim()).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Canonical lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex form (first 8 characters) for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.short_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<ContentDigest> for String {
    fn from(d: ContentDigest) -> Self {
        d.to_hex()
    }
}

impl From<[u8; 32]> for ContentDigest {
    fn from(hash: [u8; 32]) -> Self {
        Self(hash)
    }
}
