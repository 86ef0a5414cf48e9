//! Test double for [`ContentHasher`].

use crate::digest::{Blake3Hasher, ContentHasher, Digest};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Hashes files with BLAKE3, except for the configured paths which always
/// fail with [`PermissionDenied`](ErrorKind::PermissionDenied).
///
/// Useful for simulating files that become unreadable between discovery and
/// hashing, which can't be done reliably with permissions when tests run as
/// root.
#[derive(Debug, Clone, Default)]
pub struct MockHasher {
    inner: Blake3Hasher,
    failing: Vec<PathBuf>,
}
impl MockHasher {
    /// Paths are matched by suffix, so `"c.txt"` matches `/any/root/c.txt`.
    pub fn failing<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inner: Blake3Hasher::default(),
            failing: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fail(&mut self, path: impl Into<PathBuf>) {
        self.failing.push(path.into());
    }
}

#[async_trait]
impl ContentHasher for MockHasher {
    async fn hash(&self, path: &Path) -> Result<Digest> {
        if self.failing.iter().any(|failing| path.ends_with(failing)) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        self.inner.hash(path).await
    }
}
