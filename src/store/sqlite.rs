//! SQLite backend for the reading store.
//!
//! Timestamps are stored as ISO 8601 text with millisecond precision and a
//! `Z` suffix, assigned by the column default. Rows written with SQLite's
//! `CURRENT_TIMESTAMP` format (`2024-05-01 12:00:00`, UTC) are accepted too.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, Row, params};

use super::{ReadingStore, StoreError};
use crate::model::Reading;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        temperature REAL,
        ph REAL,
        dissolved_oxygen REAL
    )
";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, temperature, ph, dissolved_oxygen FROM sensor_data";

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Open a fresh connection; it closes when the returned value is dropped.
    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Connection::open(&self.path)?)
    }

    fn query(&self, sql: &str, limit: Option<u32>) -> Result<Vec<Reading>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;

        let rows = match limit {
            Some(limit) => stmt
                .query_map(params![i64::from(limit)], RawRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], RawRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        rows.into_iter().map(RawRow::into_reading).collect()
    }
}

impl ReadingStore for SqliteStore {
    fn init(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(())
    }

    fn insert(&self, temperature: f64, ph: f64, dissolved_oxygen: f64) -> Result<Reading, StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO sensor_data (temperature, ph, dissolved_oxygen) VALUES (?1, ?2, ?3)",
            params![temperature, ph, dissolved_oxygen],
        )?;

        let id = conn.last_insert_rowid();
        let raw = conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            RawRow::from_row,
        )?;
        raw.into_reading()
    }

    fn fetch_recent(&self, limit: u32) -> Result<Vec<Reading>, StoreError> {
        self.query(
            &format!("{} ORDER BY julianday(timestamp) DESC, id DESC LIMIT ?1", SELECT_COLUMNS),
            Some(limit),
        )
    }

    fn fetch_all(&self) -> Result<Vec<Reading>, StoreError> {
        self.query(&format!("{} ORDER BY julianday(timestamp) ASC, id ASC", SELECT_COLUMNS), None)
    }
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

/// Columns as SQLite hands them back, before timestamp parsing.
///
/// SQLite stores a bound NaN as NULL, so metric columns are read as
/// `Option<f64>` and NULL comes back as NaN.
struct RawRow {
    id: i64,
    timestamp: String,
    temperature: Option<f64>,
    ph: Option<f64>,
    dissolved_oxygen: Option<f64>,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            temperature: row.get(2)?,
            ph: row.get(3)?,
            dissolved_oxygen: row.get(4)?,
        })
    }

    fn into_reading(self) -> Result<Reading, StoreError> {
        Ok(Reading {
            id: self.id,
            timestamp: parse_timestamp(&self.timestamp)?,
            temperature: self.temperature.unwrap_or(f64::NAN),
            ph: self.ph.unwrap_or(f64::NAN),
            dissolved_oxygen: self.dissolved_oxygen.unwrap_or(f64::NAN),
        })
    }
}

/// Parse a stored timestamp: RFC 3339 first, then SQLite's naive UTC format.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StoreError::BadTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_column_default_format() {
        let ts = parse_timestamp("2024-05-01T12:30:15.250Z").expect("default format should parse");
        assert_eq!(
            ts,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap()
                + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_parses_current_timestamp_format() {
        let ts = parse_timestamp("2024-05-01 12:30:15").expect("CURRENT_TIMESTAMP format should parse");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap());
    }

    #[test]
    fn test_offset_timestamps_are_normalized_to_utc() {
        let ts = parse_timestamp("2024-05-01T07:00:00-05:00").expect("offset timestamp should parse");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_timestamp_is_an_error() {
        let result = parse_timestamp("not-a-datetime");
        assert!(
            matches!(result, Err(StoreError::BadTimestamp(ref v)) if v == "not-a-datetime"),
            "unparseable timestamp should be rejected, got {:?}",
            result
        );
    }

    #[test]
    fn test_relative_path_is_kept_verbatim() {
        let store = SqliteStore::new("aqua_track.db");
        assert_eq!(store.path(), Path::new("aqua_track.db"));
    }
}
