//! Error types for the [`catalog`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.
//!
//! Only fatal errors show up here. A file that can't be read is not an error
//! of the catalog run: it's recorded as failed in the inventory and reported
//! as a [`FileOutcome::Failed`](super::FileOutcome::Failed).

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a catalog failure.
///
/// ### Configuration Errors
/// - [`ErrorKind::InvalidRoot`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Store`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The root path doesn't exist or isn't a directory. Raised before the
    /// inventory is touched.
    #[display("invalid catalog root: {}", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
    /// A write to (or read from) the [`Repository`](filecat_inventory::Repository) failed.
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
