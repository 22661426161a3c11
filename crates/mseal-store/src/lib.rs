//! Content repository for MediaSeal.
//!
//! A durable blob store addressed by [`RecordId`](mseal_types::RecordId).
//! The repository holds at most one blob per id; overwrites are not a
//! supported workflow (re-registration uses a new id), so `put` on an
//! existing key is rejected rather than replaced.
//!
//! # Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`]: `HashMap`-based store for tests and embedding
//! - [`FsContentStore`]: one `<id>.<ext>` file per blob under a root directory
//!
//! # Design Rules
//!
//! 1. The store never interprets blob contents; it is a pure key-value store.
//! 2. Missing blobs read as `Ok(None)`; only real failures are errors.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsContentStore;
pub use memory::InMemoryContentStore;
pub use traits::{ContentStore, StoredLocation};
