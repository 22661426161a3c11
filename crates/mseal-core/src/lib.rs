//! Registration and verification services for MediaSeal.
//!
//! This crate is the protocol core: everything with a real invariant lives
//! here. [`RegistrationService`] runs the two-phase register sequence
//! (generate id → hash → store → ledger-write) and
//! [`VerificationService`] runs the verify sequence (fetch or accept local
//! bytes → rehash → ledger-read → compare).
//!
//! Both services take their collaborators (a
//! [`ContentStore`](mseal_store::ContentStore) and a
//! [`Ledger`](mseal_ledger::Ledger)) as injected `Arc<dyn ...>` instances,
//! so any backend (or test double) slots in behind the same seams.
//!
//! # Failure handling
//!
//! Nothing is retried and nothing is rolled back. A store failure aborts
//! registration before the ledger is touched; a ledger failure after the
//! store succeeded is surfaced as
//! [`RegisterError::Partial`] with the generated id, for manual
//! reconciliation. Verification keeps three outcomes strictly apart: record
//! not found, record found but tampered, record found and authentic. A
//! digest mismatch is a successful verification with a positive tamper
//! verdict, never an error.

pub mod error;
pub mod register;
pub mod verify;

pub use error::{PartialCause, RegisterError, Stage, VerifyError};
pub use register::{Registration, RegistrationService};
pub use verify::{Verification, VerificationService};
