use crate::error::{Error, ErrorKind, Result};
use crate::record::{FileRecord, FileStatus};
use exn::ResultExt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Timestamps are stored as RFC 3339 text in UTC.
pub(crate) fn format_timestamp(timestamp: OffsetDateTime) -> Result<String> {
    timestamp.format(&Rfc3339).or_raise(|| ErrorKind::InvalidData("timestamp"))
}

pub(crate) fn now() -> Result<String> {
    format_timestamp(OffsetDateTime::now_utc())
}

fn parse_timestamp(value: Option<String>) -> Result<Option<OffsetDateTime>> {
    value
        .map(|v| OffsetDateTime::parse(&v, &Rfc3339).or_raise(|| ErrorKind::InvalidData("timestamp")))
        .transpose()
}

#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    path: String,
    name: String,
    size_bytes: Option<i64>,
    digest: Option<String>,
    status: String,
    last_seen_at: Option<String>,
    last_processed_at: Option<String>,
}
impl TryFrom<RecordRow> for FileRecord {
    type Error = Error;
    fn try_from(row: RecordRow) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            path: row.path,
            name: row.name,
            size_bytes: row
                .size_bytes
                .map(|size| u64::try_from(size).or_raise(|| ErrorKind::InvalidData("file size")))
                .transpose()?,
            digest: row.digest,
            status: row.status.parse::<FileStatus>()?,
            last_seen_at: parse_timestamp(row.last_seen_at)?,
            last_processed_at: parse_timestamp(row.last_processed_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> RecordRow {
        RecordRow {
            path: "b/b.txt".to_string(),
            name: "b.txt".to_string(),
            size_bytes: Some(0),
            digest: Some("af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262".to_string()),
            status: status.to_string(),
            last_seen_at: Some("2025-03-01T12:30:00Z".to_string()),
            last_processed_at: None,
        }
    }

    #[test]
    fn test_row_to_model() {
        let model = FileRecord::try_from(row("processed")).unwrap();
        assert_eq!(model.status, FileStatus::Processed);
        assert_eq!(model.size_bytes, Some(0));
        let seen = model.last_seen_at.unwrap();
        assert_eq!(seen.year(), 2025);
        assert_eq!(seen.hour(), 12);
        assert!(model.last_processed_at.is_none());
    }

    #[test]
    fn test_row_with_bad_status() {
        assert!(FileRecord::try_from(row("exploded")).is_err());
    }

    #[test]
    fn test_row_with_negative_size() {
        let mut row = row("processed");
        row.size_bytes = Some(-1);
        assert!(FileRecord::try_from(row).is_err());
    }

    #[test]
    fn test_timestamp_round_trip() {
        let timestamp = OffsetDateTime::now_utc();
        let text = format_timestamp(timestamp).unwrap();
        assert_eq!(parse_timestamp(Some(text)).unwrap(), Some(timestamp));
    }
}
