//! Reading store: append-only persistence for sensor readings.
//!
//! Two backends implement `ReadingStore`:
//! - `sqlite` — a local database file (the default, `aqua_track.db`).
//! - `pg` — PostgreSQL, selected when the configured URL is a `postgres://` URL.
//!
//! Every operation opens its own connection and releases it when the call
//! returns. There is no pooling and no retry; errors go straight back to the
//! caller as `StoreError`.

pub mod pg;
pub mod sqlite;

use crate::model::Reading;
use std::fmt;

pub use self::pg::PgStore;
pub use self::sqlite::SqliteStore;

/// Table holding every reading ever inserted.
pub const TABLE_NAME: &str = "sensor_data";

/// Window used when callers don't ask for a specific number of readings.
pub const DEFAULT_RECENT_LIMIT: u32 = 200;

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

pub trait ReadingStore {
    /// Ensure the `sensor_data` table exists. Safe to call repeatedly.
    fn init(&self) -> Result<(), StoreError>;

    /// Append one reading. The store assigns `id` and `timestamp`; values
    /// are not range-checked.
    fn insert(&self, temperature: f64, ph: f64, dissolved_oxygen: f64)
        -> Result<Reading, StoreError>;

    /// The `limit` most recent readings, newest first. Ties on timestamp
    /// are broken by descending id.
    fn fetch_recent(&self, limit: u32) -> Result<Vec<Reading>, StoreError>;

    /// Every reading, oldest first.
    fn fetch_all(&self) -> Result<Vec<Reading>, StoreError>;
}

/// Pick a backend from a database URL or path.
///
/// `postgres://` and `postgresql://` URLs go to PostgreSQL; anything else is
/// treated as a SQLite file path.
pub fn open_store(url: &str) -> Box<dyn ReadingStore> {
    if is_postgres_url(url) {
        Box::new(PgStore::new(url))
    } else {
        Box::new(SqliteStore::new(url))
    }
}

pub fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when talking to the reading store.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite connection or statement failure.
    Sqlite(rusqlite::Error),
    /// PostgreSQL connection or statement failure.
    Postgres(postgres::Error),
    /// The directory for the database file could not be created.
    Io(std::io::Error),
    /// A stored timestamp could not be parsed back into a `DateTime<Utc>`.
    BadTimestamp(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {}", e),
            StoreError::Postgres(e) => write!(f, "PostgreSQL error: {}", e),
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::BadTimestamp(value) => write!(f, "Unparseable timestamp: '{}'", value),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            StoreError::Postgres(e) => Some(e),
            StoreError::Io(e) => Some(e),
            StoreError::BadTimestamp(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<postgres::Error> for StoreError {
    fn from(e: postgres::Error) -> Self {
        StoreError::Postgres(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}
