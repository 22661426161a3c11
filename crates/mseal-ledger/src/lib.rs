//! Append-only record ledger for MediaSeal.
//!
//! The ledger is the external source of truth for integrity checks: one
//! write-once `(digest, registered_at)` entry per record id, readable any
//! number of times, never mutable after the write succeeds. The production
//! analog is a blockchain contract; this crate provides the trait boundary
//! plus two local implementations:
//!
//! - [`InMemoryLedger`]: `HashMap`-based ledger for tests and embedding
//! - [`FileLedger`]: hash-chained, CRC-framed append-only segment file
//!
//! Duplicate-id writes are rejected ([`LedgerError::DuplicateRecord`]);
//! append-only semantics mean there is no way to overwrite an entry short of
//! editing the backing storage out-of-band, which the hash chain then
//! exposes.

pub mod entry;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use entry::{LedgerEntry, SealedEntry, TransactionRef};
pub use error::{LedgerError, LedgerResult};
pub use file::FileLedger;
pub use memory::InMemoryLedger;
pub use traits::Ledger;
