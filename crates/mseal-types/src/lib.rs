//! Foundation types for MediaSeal.
//!
//! This crate provides the identity and integrity types used throughout the
//! MediaSeal system. Every other `mseal` crate depends on `mseal-types`.
//!
//! # Key Types
//!
//! - [`RecordId`]: random (UUID v4) identifier for one registration instance
//! - [`ContentDigest`]: fixed-length SHA-256 content fingerprint
//! - [`Record`]: the `(id, digest, registered_at)` triple held by the ledger
//! - [`MediaType`]: content type tag carried alongside stored blobs

pub mod digest;
pub mod error;
pub mod media;
pub mod record;

pub use digest::ContentDigest;
pub use error::TypeError;
pub use media::MediaType;
pub use record::{Record, RecordId};
