//! SQLite inventory database for cataloged files.
//!
//! This crate owns the persistent catalog: one row per distinct file path
//! ever observed below the configured root, carrying the file's size, content
//! digest and processing status. Nothing else in the workspace writes to the
//! database; callers go through the [`Repository`].
//!
//! # Status lifecycle
//! A row is created as [`FileStatus::Discovered`], moves to
//! [`FileStatus::Processing`] while its content is hashed, and ends as either
//! [`FileStatus::Processed`] or [`FileStatus::Failed`]. Rows are never deleted
//! by normal operation; re-running a catalog pass updates them in place.

mod db;
pub mod error;
mod models;
mod record;
mod repo;

pub use crate::db::Database;
pub use crate::record::{FileRecord, FileStatus, StatusCounts};
pub use crate::repo::Repository;
