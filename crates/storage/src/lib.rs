//! Filesystem access for the file inventory.
//!
//! Two independent pieces live here:
//! - the [`Walker`], which lazily traverses a directory tree and tags every
//!   entry as a directory, a regular file, or something to skip, and
//! - the [`ContentHasher`] contract (with [`Blake3Hasher`] as the real
//!   implementation), which folds a file's bytes into a fixed-length digest
//!   without ever holding the whole file in memory.
//!
//! Neither piece knows about the inventory database; the orchestrator in
//! `filecat-library` composes them.

pub mod digest;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod walk;

pub use crate::digest::{Blake3Hasher, ContentHasher, DEFAULT_CHUNK_SIZE, Digest, EMPTY_DIGEST};
#[cfg(feature = "mock")]
pub use crate::mock::MockHasher;
pub use crate::walk::{Entry, SkipReason, WalkEntry, Walker};
