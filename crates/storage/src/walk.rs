//! Lazy, deterministic directory traversal.
//!
//! The walker never follows symbolic links: a link (to a file or to a
//! directory) is reported as [`SkipReason::Symlink`] and left alone, which
//! makes traversal cycles impossible without having to remember visited
//! inodes.

use crate::error::{Error, ErrorKind, Result};
use async_stream::stream;
use futures::Stream;
use std::ffi::OsString;
use std::fs::FileType;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A filesystem entry found during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Location on disk (the walker root joined with [`relative`](Self::relative)).
    pub path: PathBuf,
    /// Location relative to the walker root.
    pub relative: PathBuf,
}
impl Entry {
    /// Base name of the entry, if it is valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        self.relative.file_name().and_then(|name| name.to_str())
    }
}

/// Why an entry was not handed to the caller as a file or directory.
#[derive(Debug)]
pub enum SkipReason {
    /// Symbolic links are never followed.
    Symlink,
    /// FIFOs, sockets, block/character devices.
    Special,
    /// The path relative to the root isn't valid UTF-8 and can't be stored.
    NonUtf8,
    /// The entry (or the directory containing it) could not be listed or
    /// stat'ed; typically a permission problem or a race with a deletion.
    Unreadable(Error),
}

/// One item of a walk.
#[derive(Debug)]
pub enum WalkEntry {
    Directory(Entry),
    File(Entry),
    Skipped { path: PathBuf, reason: SkipReason },
}

struct Child {
    name: OsString,
    path: PathBuf,
    file_type: std::io::Result<FileType>,
}

/// Depth-first walker rooted at a directory.
///
/// The walker holds no cursor state: every call to [`walk`](Self::walk)
/// starts a fresh traversal from the root.
///
/// # Ordering
/// Entries of a directory are yielded in byte order of their names. Once a
/// directory's own entries have been yielded, its sub-directories are
/// descended into, again in name order. Given an unchanged tree, two walks
/// produce identical sequences.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
}
impl Walker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stream every entry below the root (the root itself is not yielded).
    ///
    /// Problems with individual entries never end the stream; they are
    /// reported as [`WalkEntry::Skipped`] and the traversal moves on.
    pub fn walk(&self) -> impl Stream<Item = WalkEntry> + Send + '_ {
        let mut stack = vec![self.root.clone()];
        // `rustfmt` does not format macros that use braces. Wrap in parentheses!
        stream!({
            while let Some(current) = stack.pop() {
                let children = match Self::read_sorted(&current).await {
                    Ok(children) => children,
                    Err(e) => {
                        yield WalkEntry::Skipped { path: current, reason: SkipReason::Unreadable(e) };
                        continue;
                    },
                };
                let mut descend = Vec::new();
                for child in children {
                    match self.classify(child) {
                        WalkEntry::Directory(entry) => {
                            descend.push(entry.path.clone());
                            yield WalkEntry::Directory(entry);
                        },
                        other => yield other,
                    }
                }
                // Stack is LIFO: push in reverse so the first name is popped first.
                stack.extend(descend.into_iter().rev());
            }
        })
    }

    async fn read_sorted(dir: &Path) -> Result<Vec<Child>> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| ErrorKind::from_io(e, dir))?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, dir))? {
            // `DirEntry::file_type` does not traverse symlinks.
            let file_type = entry.file_type().await;
            children.push(Child {
                name: entry.file_name(),
                path: entry.path(),
                file_type,
            });
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn classify(&self, child: Child) -> WalkEntry {
        let file_type = match child.file_type {
            Ok(file_type) => file_type,
            Err(e) => {
                let reason = SkipReason::Unreadable(Error::from(ErrorKind::from_io(e, &child.path)));
                return WalkEntry::Skipped { path: child.path, reason };
            },
        };
        if file_type.is_symlink() {
            return WalkEntry::Skipped { path: child.path, reason: SkipReason::Symlink };
        }
        let relative = child.path.strip_prefix(&self.root).map(Path::to_path_buf).unwrap_or_else(|_| child.path.clone());
        if relative.to_str().is_none() {
            return WalkEntry::Skipped { path: child.path, reason: SkipReason::NonUtf8 };
        }
        let entry = Entry { path: child.path, relative };
        if file_type.is_dir() {
            WalkEntry::Directory(entry)
        } else if file_type.is_file() {
            WalkEntry::File(entry)
        } else {
            WalkEntry::Skipped { path: entry.path, reason: SkipReason::Special }
        }
    }
}
