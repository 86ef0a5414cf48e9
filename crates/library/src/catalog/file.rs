use crate::catalog::error::{ErrorKind as CatalogErrorKind, Result as CatalogResult};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use exn::ResultExt;
use filecat_inventory::Repository;
use filecat_storage::error::Error as StorageError;
use filecat_storage::{ContentHasher, Digest, Entry};
use std::path::PathBuf;

/// The outcome of cataloging a single regular file.
///
/// Both variants mean the inventory row was written; only a store failure
/// stops a file from producing an outcome at all.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was hashed and its row is now `processed`.
    Processed { path: PathBuf, digest: Digest },
    /// The file couldn't be read and its row is now `failed`.
    Failed { path: PathBuf, error: StorageError },
}
impl FileOutcome {
    /// Root-relative path of the file.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Processed { path, .. } | Self::Failed { path, .. } => path,
        }
    }
}

/// Catalogs one walker entry: discover, mark processing, hash, record.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Catalog>`](LibraryErrorKind::Catalog)
/// only when the inventory can't be written. Read errors are recorded and
/// returned as [`FileOutcome::Failed`].
pub async fn catalog_file(hasher: &dyn ContentHasher, repo: &Repository, entry: &Entry) -> LibraryResult<FileOutcome> {
    catalog_file_inner(hasher, repo, entry).await.or_raise(|| LibraryErrorKind::Catalog)
}

pub(crate) async fn catalog_file_inner(
    hasher: &dyn ContentHasher,
    repo: &Repository,
    entry: &Entry,
) -> CatalogResult<FileOutcome> {
    let path = &entry.relative;
    let name = entry.name().unwrap_or_default();
    repo.upsert_discovered(path, name).await.or_raise(|| CatalogErrorKind::Store)?;
    repo.mark_processing(path).await.or_raise(|| CatalogErrorKind::Store)?;
    match hasher.hash(&entry.path).await {
        Ok(digest) => {
            repo.record_success(path, digest.size, &digest.hash).await.or_raise(|| CatalogErrorKind::Store)?;
            tracing::debug!(path = %path.display(), size = digest.size, digest = %digest.hash, "Processed file");
            Ok(FileOutcome::Processed { path: path.clone(), digest })
        },
        Err(error) => {
            tracing::warn!(path = %path.display(), error = ?error, "Could not read file; recording failure");
            repo.record_failure(path).await.or_raise(|| CatalogErrorKind::Store)?;
            Ok(FileOutcome::Failed { path: path.clone(), error })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filecat_inventory::{Database, FileStatus};
    use filecat_storage::{Blake3Hasher, MockHasher};
    use std::path::Path;

    fn entry(root: &Path, relative: &str) -> Entry {
        Entry { path: root.join(relative), relative: PathBuf::from(relative) }
    }

    #[tokio::test]
    async fn test_processed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"hi").unwrap();
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let outcome = catalog_file(&Blake3Hasher::default(), &repo, &entry(temp_dir.path(), "a.txt")).await.unwrap();
        assert!(matches!(&outcome, FileOutcome::Processed { digest, .. } if digest.size == 2));
        assert_eq!(outcome.path(), Path::new("a.txt"));
        let record = repo.get_by_path("a.txt").await.unwrap().unwrap();
        assert_eq!(record.status, FileStatus::Processed);
        assert_eq!(record.name, "a.txt");
        assert_eq!(record.digest.unwrap(), blake3::hash(b"hi").to_hex().to_string());
        db.close().await;
    }

    #[tokio::test]
    async fn test_vanished_file_is_recorded_as_failed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        // Discovered by a walk, deleted before hashing.
        let gone = entry(temp_dir.path(), "gone.txt");
        let outcome = catalog_file(&Blake3Hasher::default(), &repo, &gone).await.unwrap();
        assert!(matches!(outcome, FileOutcome::Failed { .. }));
        let record = repo.get_by_path("gone.txt").await.unwrap().unwrap();
        assert_eq!(record.status, FileStatus::Failed);
        assert!(record.digest.is_none());
        db.close().await;
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"hi").unwrap();
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        db.close().await;
        let hasher = MockHasher::default();
        let err = catalog_file_inner(&hasher, &repo, &entry(temp_dir.path(), "a.txt")).await.unwrap_err();
        assert!(matches!(&*err, CatalogErrorKind::Store));
    }
}
