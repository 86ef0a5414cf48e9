use crate::catalog::error::{ErrorKind as CatalogErrorKind, Result as CatalogResult};
use crate::catalog::file::{FileOutcome, catalog_file_inner};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use async_stream::stream;
use exn::{OptionExt, ResultExt};
use filecat_inventory::Repository;
use filecat_storage::{ContentHasher, SkipReason, WalkEntry, Walker};
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Progress events emitted by [`catalog`] as it works through the root.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once, after the root is validated.
/// 2. [`Cataloged`](Self::Cataloged) and [`Skipped`](Self::Skipped): zero or
///    more times, in walk order.
/// 3. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// A fatal error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum CatalogEvent {
    /// The (canonicalized) root was validated and the walk has begun.
    Started { root: PathBuf },
    /// A regular file went through the full lifecycle.
    Cataloged(FileOutcome),
    /// The walker skipped an entry. Nothing was persisted for it.
    Skipped { path: PathBuf, reason: SkipReason },
    /// The walk is exhausted.
    Complete(Summary),
}

/// End-of-run counts. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Regular files found by the walk.
    pub discovered: u64,
    pub processed: u64,
    pub failed: u64,
    /// Symlinks, special files and unreadable entries.
    pub skipped: u64,
}

/// Streams [`CatalogEvent`]s for one full catalog pass over `root`.
///
/// Every regular file below `root` is recorded in `repo`, hashed with
/// `hasher`, and its row updated to `processed` or `failed`. Per-file read
/// errors never end the stream. An invalid root or any inventory failure is
/// yielded as an `Err` and ends the stream.
pub fn catalog<'a>(
    root: &'a Path,
    hasher: &'a dyn ContentHasher,
    repo: &'a Repository,
) -> impl Stream<Item = LibraryResult<CatalogEvent>> + 'a {
    // `rustfmt` does not format macro-specific syntax such as
    // `for await` even using the parentheses trick.
    stream! {
        for await event in catalog_inner(root, hasher, repo) {
            yield event.or_raise(|| LibraryErrorKind::Catalog);
        }
    }
}

/// Runs [`catalog`] to completion and returns its [`Summary`].
pub async fn run(root: &Path, hasher: &dyn ContentHasher, repo: &Repository) -> LibraryResult<Summary> {
    let mut events = std::pin::pin!(catalog(root, hasher, repo));
    let mut summary = None;
    while let Some(event) = events.next().await {
        if let CatalogEvent::Complete(counts) = event? {
            summary = Some(counts);
        }
    }
    summary.ok_or_raise(|| LibraryErrorKind::Catalog)
}

/// Canonicalize `root` and check that it is a directory.
///
/// [`catalog`] does this itself; callers use it to reject a bad root before
/// opening the inventory.
pub async fn validate_root(root: &Path) -> LibraryResult<PathBuf> {
    resolve_root(root).await.or_raise(|| LibraryErrorKind::Catalog)
}

async fn resolve_root(root: &Path) -> CatalogResult<PathBuf> {
    let invalid = || CatalogErrorKind::InvalidRoot(root.to_path_buf());
    let resolved = fs::canonicalize(root).await.or_raise(invalid)?;
    let metadata = fs::metadata(&resolved).await.or_raise(invalid)?;
    if !metadata.is_dir() {
        exn::bail!(invalid());
    }
    Ok(resolved)
}

fn catalog_inner<'a>(
    root: &'a Path,
    hasher: &'a dyn ContentHasher,
    repo: &'a Repository,
) -> impl Stream<Item = CatalogResult<CatalogEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let root = match resolve_root(root).await {
            Ok(root) => root,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        tracing::info!(root = %root.display(), dry_run = repo.is_dry_run(), "Catalog run started");
        yield Ok(CatalogEvent::Started { root: root.clone() });

        let walker = Walker::new(&root);
        let mut summary = Summary::default();
        for await entry in walker.walk() {
            match entry {
                WalkEntry::Directory(_) => {},
                WalkEntry::Skipped { path, reason } => {
                    summary.skipped += 1;
                    match &reason {
                        SkipReason::Unreadable(error) => {
                            tracing::warn!(path = %path.display(), error = ?error, "Skipping unreadable entry")
                        },
                        other => tracing::debug!(path = %path.display(), reason = ?other, "Skipping entry"),
                    }
                    yield Ok(CatalogEvent::Skipped { path, reason });
                },
                WalkEntry::File(entry) => {
                    summary.discovered += 1;
                    match catalog_file_inner(hasher, repo, &entry).await {
                        Ok(outcome) => {
                            match &outcome {
                                FileOutcome::Processed { .. } => summary.processed += 1,
                                FileOutcome::Failed { .. } => summary.failed += 1,
                            }
                            yield Ok(CatalogEvent::Cataloged(outcome));
                        },
                        Err(e) => {
                            tracing::error!(path = %entry.relative.display(), "Inventory write failed; aborting run");
                            yield Err(e);
                            return;
                        },
                    }
                },
            }
        }

        tracing::info!(
            discovered = summary.discovered,
            processed = summary.processed,
            failed = summary.failed,
            skipped = summary.skipped,
            "Catalog run complete"
        );
        yield Ok(CatalogEvent::Complete(summary));
    })
}
