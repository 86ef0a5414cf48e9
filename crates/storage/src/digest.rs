//! Content hashing.
//!
//! Files are read through a fixed-size buffer and folded into a BLAKE3 hasher
//! chunk by chunk, so peak memory is bounded by the chunk size no matter how
//! large the file is.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::instrument;

/// Default read buffer size for hashing.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
/// BLAKE3 digest of the empty input.
pub const EMPTY_DIGEST: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

/// The result of hashing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Lowercase hexadecimal hash of the file contents (64 characters).
    pub hash: String,
    /// Exact number of bytes that were read and hashed.
    pub size: u64,
}

/// Computes the content digest of a file on disk.
///
/// The orchestrator only talks to this trait, so the hashing strategy (or a
/// test double) can be swapped without touching the pipeline.
#[async_trait]
pub trait ContentHasher: Send + Sync {
    /// Hash the file at `path`.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound),
    /// [`PermissionDenied`](ErrorKind::PermissionDenied) or
    /// [`Io`](ErrorKind::Io) if the file cannot be opened or a read fails
    /// part-way through. An empty file is not an error.
    async fn hash(&self, path: &Path) -> Result<Digest>;

    /// Re-hash the file and compare it against a previously computed digest.
    async fn verify(&self, path: &Path, expected: &Digest) -> Result<bool> {
        Ok(self.hash(path).await? == *expected)
    }
}

/// Streaming BLAKE3 hasher.
#[derive(Debug, Clone)]
pub struct Blake3Hasher {
    chunk_size: usize,
}
impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}
impl Blake3Hasher {
    /// A chunk size of zero is bumped to one byte.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1) }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

#[async_trait]
impl ContentHasher for Blake3Hasher {
    #[instrument(skip(self), fields(path = %path.display(), size))]
    async fn hash(&self, path: &Path) -> Result<Digest> {
        // The handle is dropped (and closed) on every return path below.
        let mut file = fs::File::open(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut size: u64 = 0;
        loop {
            let read = file.read(&mut buffer).await.map_err(|e| ErrorKind::from_io(e, path))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            size += read as u64;
        }
        tracing::Span::current().record("size", size);
        Ok(Digest { hash: hasher.finalize().to_hex().to_string(), size })
    }
}
