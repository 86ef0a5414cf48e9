//! The catalog pipeline: walk → hash → persist.
//!
//! A catalog run walks the configured root with a
//! [`Walker`](filecat_storage::Walker) and, for every regular file, drives
//! its inventory row through the status lifecycle:
//!
//! 1. [`upsert_discovered`](filecat_inventory::Repository::upsert_discovered)
//! 2. [`mark_processing`](filecat_inventory::Repository::mark_processing)
//! 3. hash the contents with the injected
//!    [`ContentHasher`](filecat_storage::ContentHasher), then either
//!    [`record_success`](filecat_inventory::Repository::record_success) or
//!    [`record_failure`](filecat_inventory::Repository::record_failure).
//!
//! Files are processed one at a time, in walk order, so the writes for a path
//! can never interleave. Directories and skipped entries are never persisted.
//!
//! The primary entry point is [`catalog`], which streams [`CatalogEvent`]s;
//! [`run`] drains that stream and returns the final [`Summary`].

pub mod error;
mod file;
mod stream;

pub use self::file::{FileOutcome, catalog_file};
pub use self::stream::{CatalogEvent, Summary, catalog, run, validate_root};
