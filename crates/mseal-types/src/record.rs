use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::ContentDigest;
use crate::error::TypeError;

/// Opaque identifier for one registration instance.
///
/// A `RecordId` is generated fresh (UUID v4) for every registration and is
/// never reused. It is deliberately *not* derived from content: two
/// registrations of identical bytes get different ids, because the id names
/// an instance of registration, not the content itself. Uniqueness rests on
/// the randomness of the generator; the ledger is the final arbiter and
/// rejects duplicate writes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the canonical hyphenated form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| TypeError::InvalidRecordId(e.to_string()))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The unit of integrity tracking: one `(id, digest, registered_at)` triple.
///
/// A `Record` is created once by registration, read (never mutated) by
/// verification, and has no destruction — the ledger it lives in is
/// append-only. `registered_at` is assigned by the ledger at write time,
/// never supplied by the client, so registrations cannot be backdated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub digest: ContentDigest,
    /// Unix seconds, assigned by the ledger.
    pub registered_at: u64,
}
