use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use mseal_types::{ContentDigest, RecordId};

/// What `read(id)` returns: the write-once half of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub digest: ContentDigest,
    /// Unix seconds, assigned by the ledger at write time.
    pub registered_at: u64,
}

/// Confirmation handle returned by a successful `register`.
///
/// The hash of the sealed entry, playing the role of a transaction hash: it
/// commits to the entry's position in the chain as well as its contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRef([u8; 32]);

impl TransactionRef {
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex form (first 8 characters) for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionRef({})", self.short_hex())
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// One appended ledger entry, hash-linked to its predecessor.
///
/// `seal` commits to (seq, prev, id, digest, registered_at), so any
/// out-of-band edit to an entry breaks its own seal, and any removal or
/// reordering breaks the seal of every later entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEntry {
    /// 1-based position in the chain.
    pub seq: u64,
    /// Seal of the previous entry; all zeros for the first entry.
    pub prev: [u8; 32],
    pub id: RecordId,
    pub digest: ContentDigest,
    pub registered_at: u64,
}

impl SealedEntry {
    /// Compute this entry's seal.
    pub fn seal(&self) -> TransactionRef {
        let mut hasher = Sha256::new();
        hasher.update(self.seq.to_be_bytes());
        hasher.update(self.prev);
        hasher.update(self.id.as_uuid().as_bytes());
        hasher.update(self.digest.as_bytes());
        hasher.update(self.registered_at.to_be_bytes());
        TransactionRef::from_hash(hasher.finalize().into())
    }

    /// The readable half of this entry.
    pub fn entry(&self) -> LedgerEntry {
        LedgerEntry {
            digest: self.digest,
            registered_at: self.registered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seq: u64, prev: [u8; 32]) -> SealedEntry {
        SealedEntry {
            seq,
            prev,
            id: RecordId::generate(),
            digest: ContentDigest::from_hash([0x11; 32]),
            registered_at: 1_700_000_000,
        }
    }

    #[test]
    fn seal_is_deterministic() {
        let entry = sample(1, [0; 32]);
        assert_eq!(entry.seal(), entry.seal());
    }

    #[test]
    fn seal_depends_on_every_field() {
        let base = sample(1, [0; 32]);
        let mut reseq = base;
        reseq.seq = 2;
        let mut relinked = base;
        relinked.prev = [0xff; 32];
        let mut redated = base;
        redated.registered_at += 1;
        let mut redigested = base;
        redigested.digest = ContentDigest::from_hash([0x22; 32]);

        for changed in [reseq, relinked, redated, redigested] {
            assert_ne!(changed.seal(), base.seal());
        }
    }

    #[test]
    fn transaction_ref_hex() {
        let tx = TransactionRef::from_hash([0xab; 32]);
        assert_eq!(tx.to_hex(), "ab".repeat(32));
        assert_eq!(tx.short_hex(), "abababab");
    }
}
