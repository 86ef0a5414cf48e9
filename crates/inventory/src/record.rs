use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;
use time::OffsetDateTime;

/// Processing status of a file record.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// Seen by the walker, not hashed yet.
    #[display("discovered")]
    Discovered,
    /// Hashing has started but not finished. A row left in this state means
    /// the run that started it was interrupted.
    #[display("processing")]
    Processing,
    /// Hashed successfully; `digest` and `size_bytes` are current.
    #[display("processed")]
    Processed,
    /// The file could not be read. Any digest on the row is from an earlier
    /// successful run.
    #[display("failed")]
    Failed,
}
impl FileStatus {
    pub const ALL: [FileStatus; 4] = [Self::Discovered, Self::Processing, Self::Processed, Self::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }
}
impl FromStr for FileStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discovered" => Ok(Self::Discovered),
            "processing" => Ok(Self::Processing),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            _ => exn::bail!(ErrorKind::InvalidData("status")),
        }
    }
}

/// A single row of the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the catalog root; unique.
    pub path: String,
    /// Base name of [`path`](Self::path).
    pub name: String,
    /// Size at the time of the last successful hash.
    pub size_bytes: Option<u64>,
    /// BLAKE3 hex digest at the time of the last successful hash.
    pub digest: Option<String>,
    pub status: FileStatus,
    pub last_seen_at: Option<OffsetDateTime>,
    pub last_processed_at: Option<OffsetDateTime>,
}

/// Number of records per [`FileStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub discovered: u64,
    pub processing: u64,
    pub processed: u64,
    pub failed: u64,
}
impl StatusCounts {
    pub fn get(&self, status: FileStatus) -> u64 {
        match status {
            FileStatus::Discovered => self.discovered,
            FileStatus::Processing => self.processing,
            FileStatus::Processed => self.processed,
            FileStatus::Failed => self.failed,
        }
    }

    pub(crate) fn add(&mut self, status: FileStatus, count: u64) {
        match status {
            FileStatus::Discovered => self.discovered += count,
            FileStatus::Processing => self.processing += count,
            FileStatus::Processed => self.processed += count,
            FileStatus::Failed => self.failed += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.discovered + self.processing + self.processed + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("discovered", FileStatus::Discovered)]
    #[case("processing", FileStatus::Processing)]
    #[case("processed", FileStatus::Processed)]
    #[case("failed", FileStatus::Failed)]
    #[case("FAILED", FileStatus::Failed)]
    #[case(" processed ", FileStatus::Processed)]
    fn test_from_str(#[case] input: &str, #[case] expected: FileStatus) {
        assert_eq!(input.parse::<FileStatus>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("done")]
    #[case("process")]
    fn test_from_str_invalid(#[case] input: &str) {
        assert!(input.parse::<FileStatus>().is_err());
    }

    #[test]
    fn test_display_matches_as_str() {
        for status in FileStatus::ALL {
            assert_eq!(status.to_string(), status.as_str());
            assert_eq!(status.as_str().parse::<FileStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_counts() {
        let mut counts = StatusCounts::default();
        counts.add(FileStatus::Processed, 3);
        counts.add(FileStatus::Failed, 1);
        counts.add(FileStatus::Processed, 2);
        assert_eq!(counts.get(FileStatus::Processed), 5);
        assert_eq!(counts.get(FileStatus::Failed), 1);
        assert_eq!(counts.get(FileStatus::Discovered), 0);
        assert_eq!(counts.total(), 6);
    }
}
