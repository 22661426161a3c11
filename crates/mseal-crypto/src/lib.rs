//! Content hashing for MediaSeal.
//!
//! A single digest function over one fixed algorithm. All crypto operations
//! wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
