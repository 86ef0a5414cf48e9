//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. These are the "read errors" of the
//! pipeline: they are recovered per file by the orchestrator and never abort
//! a catalog run on their own.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File or directory does not exist (or vanished mid-walk).
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied by filesystem permissions.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Classify an I/O error that happened while touching `path`.
    pub(crate) fn from_io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn test_from_io_classification() {
        let path = Path::new("some/file.txt");
        let kind = ErrorKind::from_io(IoError::from(IoErrorKind::NotFound), path);
        assert!(matches!(kind, ErrorKind::NotFound(p) if p == path));
        let kind = ErrorKind::from_io(IoError::from(IoErrorKind::PermissionDenied), path);
        assert!(matches!(kind, ErrorKind::PermissionDenied(p) if p == path));
        let kind = ErrorKind::from_io(IoError::from(IoErrorKind::UnexpectedEof), path);
        assert!(matches!(kind, ErrorKind::Io(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(!ErrorKind::NotFound(PathBuf::from("a")).is_retryable());
        assert!(!ErrorKind::PermissionDenied(PathBuf::from("a")).is_retryable());
        assert!(ErrorKind::Io(IoError::from(IoErrorKind::Interrupted)).is_retryable());
    }

    #[test]
    fn test_display() {
        let kind = ErrorKind::PermissionDenied(PathBuf::from("c.txt"));
        assert_eq!(kind.to_string(), "permission denied: c.txt");
    }
}
