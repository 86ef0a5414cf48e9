//! Repository for [`FileRecord`] entries.
//!
//! All writes for a given path are expected to arrive in lifecycle order from
//! a single caller; the repository does not serialize concurrent writers.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{RecordRow, now};
use crate::record::{FileRecord, FileStatus, StatusCounts};
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteQueryResult;
use std::path::Path;
use tracing::instrument;

/// Repository for managing file records in the inventory database.
///
/// # Dry runs
/// A repository created with `dry_run = true` turns every write into a no-op
/// while reads keep working against whatever is already stored.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn sqlx_hates_paths(path: impl AsRef<Path>) -> Result<String> {
        Ok(path.as_ref().to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string())
    }

    fn ensure_updated(result: SqliteQueryResult, path: String) -> Result<()> {
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::RecordNotFound(path));
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Record that a file exists at `path`.
    ///
    /// Unknown paths get a new row with status
    /// [`Discovered`](FileStatus::Discovered). Known paths only get their
    /// `last_seen_at` refreshed: re-discovery alone never invalidates an
    /// earlier status or digest.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn upsert_discovered(&self, path: impl AsRef<Path>, name: &str) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        sqlx::query(include_str!("../queries/upsert_discovered.sql"))
            .bind(Self::sqlx_hates_paths(path)?)
            .bind(name)
            .bind(now()?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Flag a file as being hashed.
    ///
    /// Returns [`ErrorKind::RecordNotFound`] if the path was never discovered.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn mark_processing(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let path = Self::sqlx_hates_paths(path)?;
        let result = sqlx::query(include_str!("../queries/mark_processing.sql"))
            .bind(path.as_str())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::ensure_updated(result, path)
    }

    /// Store the outcome of a successful hash and mark the file
    /// [`Processed`](FileStatus::Processed).
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn record_success(&self, path: impl AsRef<Path>, size_bytes: u64, digest: &str) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let path = Self::sqlx_hates_paths(path)?;
        let size_bytes = i64::try_from(size_bytes).or_raise(|| ErrorKind::InvalidData("file size"))?;
        let result = sqlx::query(include_str!("../queries/record_success.sql"))
            .bind(path.as_str())
            .bind(size_bytes)
            .bind(digest)
            .bind(now()?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::ensure_updated(result, path)
    }

    /// Mark a file [`Failed`](FileStatus::Failed).
    ///
    /// Any digest and size from an earlier successful run are left in place.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn record_failure(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let path = Self::sqlx_hates_paths(path)?;
        let result = sqlx::query(include_str!("../queries/record_failure.sql"))
            .bind(path.as_str())
            .bind(now()?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::ensure_updated(result, path)
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get the record for a root-relative path.
    pub async fn get_by_path(&self, path: impl AsRef<Path>) -> Result<Option<FileRecord>> {
        let row: Option<RecordRow> = sqlx::query_as(include_str!("../queries/get_by_path.sql"))
            .bind(Self::sqlx_hates_paths(path)?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(FileRecord::try_from).transpose()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List every record, ordered by path.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(include_str!("../queries/list_all.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(FileRecord::try_from).collect()
    }

    /// List records with the given status, ordered by path.
    ///
    /// Listing [`Failed`](FileStatus::Failed) records shows what the next run
    /// will retry.
    pub async fn list_by_status(&self, status: FileStatus) -> Result<Vec<FileRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(include_str!("../queries/list_by_status.sql"))
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(FileRecord::try_from).collect()
    }

    /// Count records per status.
    pub async fn count_by_status(&self) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(include_str!("../queries/count_by_status.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let count = u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))?;
            counts.add(status.parse()?, count);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST_A: &str = "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4";
    const DIGEST_B: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

    async fn repository() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        (db, repo)
    }

    #[tokio::test]
    async fn test_upsert_creates_discovered_row() {
        let (db, repo) = repository().await;
        repo.upsert_discovered("b/b.txt", "b.txt").await.unwrap();
        let record = repo.get_by_path("b/b.txt").await.unwrap().unwrap();
        assert_eq!(record.path, "b/b.txt");
        assert_eq!(record.name, "b.txt");
        assert_eq!(record.status, FileStatus::Discovered);
        assert!(record.digest.is_none());
        assert!(record.size_bytes.is_none());
        assert!(record.last_seen_at.is_some());
        assert!(record.last_processed_at.is_none());
        db.close().await;
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (db, repo) = repository().await;
        repo.upsert_discovered("a.txt", "a.txt").await.unwrap();
        repo.mark_processing("a.txt").await.unwrap();
        assert_eq!(repo.get_by_path("a.txt").await.unwrap().unwrap().status, FileStatus::Processing);
        repo.record_success("a.txt", 2, DIGEST_A).await.unwrap();
        let record = repo.get_by_path("a.txt").await.unwrap().unwrap();
        assert_eq!(record.status, FileStatus::Processed);
        assert_eq!(record.size_bytes, Some(2));
        assert_eq!(record.digest.as_deref(), Some(DIGEST_A));
        assert!(record.last_processed_at.is_some());
        db.close().await;
    }

    #[tokio::test]
    async fn test_rediscovery_keeps_status_and_digest() {
        let (db, repo) = repository().await;
        repo.upsert_discovered("a.txt", "a.txt").await.unwrap();
        repo.mark_processing("a.txt").await.unwrap();
        repo.record_success("a.txt", 2, DIGEST_A).await.unwrap();
        let before = repo.get_by_path("a.txt").await.unwrap().unwrap();
        repo.upsert_discovered("a.txt", "a.txt").await.unwrap();
        let after = repo.get_by_path("a.txt").await.unwrap().unwrap();
        assert_eq!(after.status, FileStatus::Processed);
        assert_eq!(after.digest, before.digest);
        assert_eq!(after.size_bytes, before.size_bytes);
        assert!(after.last_seen_at >= before.last_seen_at);
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
        db.close().await;
    }

    #[tokio::test]
    async fn test_failure_preserves_previous_digest() {
        let (db, repo) = repository().await;
        repo.upsert_discovered("a.txt", "a.txt").await.unwrap();
        repo.mark_processing("a.txt").await.unwrap();
        repo.record_success("a.txt", 2, DIGEST_A).await.unwrap();
        repo.mark_processing("a.txt").await.unwrap();
        repo.record_failure("a.txt").await.unwrap();
        let record = repo.get_by_path("a.txt").await.unwrap().unwrap();
        assert_eq!(record.status, FileStatus::Failed);
        assert_eq!(record.digest.as_deref(), Some(DIGEST_A));
        assert_eq!(record.size_bytes, Some(2));
        db.close().await;
    }

    #[tokio::test]
    async fn test_failure_without_previous_digest() {
        let (db, repo) = repository().await;
        repo.upsert_discovered("c.txt", "c.txt").await.unwrap();
        repo.mark_processing("c.txt").await.unwrap();
        repo.record_failure("c.txt").await.unwrap();
        let record = repo.get_by_path("c.txt").await.unwrap().unwrap();
        assert_eq!(record.status, FileStatus::Failed);
        assert!(record.digest.is_none());
        db.close().await;
    }

    #[tokio::test]
    async fn test_updates_on_unknown_path() {
        let (db, repo) = repository().await;
        let err = repo.mark_processing("nope.txt").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::RecordNotFound(p) if p == "nope.txt"));
        assert!(repo.record_success("nope.txt", 1, DIGEST_A).await.is_err());
        assert!(repo.record_failure("nope.txt").await.is_err());
        assert!(repo.get_by_path("nope.txt").await.unwrap().is_none());
        db.close().await;
    }

    #[tokio::test]
    async fn test_listing_and_counts() {
        let (db, repo) = repository().await;
        for (path, name) in [("a.txt", "a.txt"), ("b/b.txt", "b.txt"), ("c.txt", "c.txt"), ("d.txt", "d.txt")] {
            repo.upsert_discovered(path, name).await.unwrap();
        }
        repo.mark_processing("a.txt").await.unwrap();
        repo.record_success("a.txt", 2, DIGEST_A).await.unwrap();
        repo.mark_processing("b/b.txt").await.unwrap();
        repo.record_success("b/b.txt", 0, DIGEST_B).await.unwrap();
        repo.mark_processing("c.txt").await.unwrap();
        repo.record_failure("c.txt").await.unwrap();

        let all: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(all, vec!["a.txt", "b/b.txt", "c.txt", "d.txt"]);
        let processed: Vec<String> =
            repo.list_by_status(FileStatus::Processed).await.unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(processed, vec!["a.txt", "b/b.txt"]);

        let counts = repo.count_by_status().await.unwrap();
        assert_eq!(counts, StatusCounts { discovered: 1, processing: 0, processed: 2, failed: 1 });
        db.close().await;
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::new(db.pool().clone(), true);
        assert!(repo.is_dry_run());
        repo.upsert_discovered("a.txt", "a.txt").await.unwrap();
        repo.mark_processing("a.txt").await.unwrap();
        repo.record_success("a.txt", 2, DIGEST_A).await.unwrap();
        repo.record_failure("a.txt").await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
        assert_eq!(repo.count_by_status().await.unwrap().total(), 0);
        db.close().await;
    }
}
