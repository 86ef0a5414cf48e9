//! Inventory Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Every error in this crate is fatal
//! to a catalog run: if the inventory can't be written, there's nothing
//! meaningful left to do.

use derive_more::{Display, Error};

/// An inventory error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database schema error")]
    Schema,
    /// A status update was issued for a path that was never discovered.
    #[display("record not found: {_0}")]
    RecordNotFound(#[error(not(source))] String),
    /// Serialization/deserialization error.
    #[display("invalid inventory data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
