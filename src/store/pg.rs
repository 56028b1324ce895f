//! PostgreSQL backend for the reading store.
//!
//! Uses the synchronous `postgres` client with chrono support, so
//! `TIMESTAMPTZ` columns map straight onto `DateTime<Utc>`.

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls, Row};

use super::{ReadingStore, StoreError};
use crate::model::Reading;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS sensor_data (
        id BIGSERIAL PRIMARY KEY,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
        temperature DOUBLE PRECISION,
        ph DOUBLE PRECISION,
        dissolved_oxygen DOUBLE PRECISION
    )
";

pub struct PgStore {
    url: String,
}

impl PgStore {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string() }
    }

    /// Open a fresh connection; it closes when the returned client is dropped.
    fn connect(&self) -> Result<Client, StoreError> {
        Ok(Client::connect(&self.url, NoTls)?)
    }
}

impl ReadingStore for PgStore {
    fn init(&self) -> Result<(), StoreError> {
        let mut client = self.connect()?;
        client.batch_execute(CREATE_TABLE)?;
        Ok(())
    }

    fn insert(&self, temperature: f64, ph: f64, dissolved_oxygen: f64) -> Result<Reading, StoreError> {
        let mut client = self.connect()?;
        let row = client.query_one(
            "INSERT INTO sensor_data (temperature, ph, dissolved_oxygen)
             VALUES ($1, $2, $3)
             RETURNING id, timestamp, temperature, ph, dissolved_oxygen",
            &[&temperature, &ph, &dissolved_oxygen],
        )?;
        reading_from_row(&row)
    }

    fn fetch_recent(&self, limit: u32) -> Result<Vec<Reading>, StoreError> {
        let mut client = self.connect()?;
        let rows = client.query(
            "SELECT id, timestamp, temperature, ph, dissolved_oxygen
             FROM sensor_data
             ORDER BY timestamp DESC, id DESC
             LIMIT $1",
            &[&i64::from(limit)],
        )?;
        rows.iter().map(reading_from_row).collect()
    }

    fn fetch_all(&self) -> Result<Vec<Reading>, StoreError> {
        let mut client = self.connect()?;
        let rows = client.query(
            "SELECT id, timestamp, temperature, ph, dissolved_oxygen
             FROM sensor_data
             ORDER BY timestamp ASC, id ASC",
            &[],
        )?;
        rows.iter().map(reading_from_row).collect()
    }
}

/// NULL metric columns (rows written by other tools) come back as NaN.
/// Columns of the wrong SQL type are an error, not a panic.
fn reading_from_row(row: &Row) -> Result<Reading, StoreError> {
    Ok(Reading {
        id: row.try_get(0)?,
        timestamp: row.try_get::<_, DateTime<Utc>>(1)?,
        temperature: row.try_get::<_, Option<f64>>(2)?.unwrap_or(f64::NAN),
        ph: row.try_get::<_, Option<f64>>(3)?.unwrap_or(f64::NAN),
        dissolved_oxygen: row.try_get::<_, Option<f64>>(4)?.unwrap_or(f64::NAN),
    })
}
