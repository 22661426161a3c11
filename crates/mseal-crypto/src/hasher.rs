use sha2::{Digest, Sha256};

use mseal_types::ContentDigest;

/// Deterministic SHA-256 content hasher.
///
/// The algorithm is a system-wide constant: every digest ever written to the
/// ledger was produced by this function, and verification recomputes with it.
/// Changing the algorithm would invalidate comparability with previously
/// registered digests, so there is no per-call algorithm choice.
pub struct ContentHasher;

impl ContentHasher {
    /// Hash the full byte sequence and return its digest.
    ///
    /// Pure and deterministic. The input is consumed in one pass without
    /// copying, so large files cost one buffer, not two.
    pub fn digest(data: &[u8]) -> ContentDigest {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest::from_hash(hasher.finalize().into())
    }

    /// Recompute and compare against an expected digest.
    pub fn verify(data: &[u8], expected: &ContentDigest) -> bool {
        Self::digest(data) == *expected
    }
}
