//! Core data types for the AquaTrack pond monitoring service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic and no I/O, only types and their display helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single timestamped water-quality sample, as stored in `sensor_data`.
///
/// `id` and `timestamp` are assigned by the store on insert. Values are kept
/// exactly as they were inserted; out-of-domain numbers (pH above 14, negative
/// temperatures) are legal here and only classified by `alert::thresholds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,      // °C
    pub ph: f64,               // dimensionless, 0–14 in practice
    pub dissolved_oxygen: f64, // mg/L
}

impl Reading {
    /// Value of a single metric on this reading.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Ph => self.ph,
            Metric::DissolvedOxygen => self.dissolved_oxygen,
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// The three quantities every reading carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Ph,
    DissolvedOxygen,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Ph, Metric::DissolvedOxygen];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Ph => "pH",
            Metric::DissolvedOxygen => "Dissolved Oxygen",
        }
    }

    /// Unit suffix used when rendering values. pH has none.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Ph => "",
            Metric::DissolvedOxygen => " mg/L",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_selects_matching_field() {
        let reading = Reading {
            id: 7,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            temperature: 24.5,
            ph: 7.2,
            dissolved_oxygen: 6.8,
        };
        assert_eq!(reading.value(Metric::Temperature), 24.5);
        assert_eq!(reading.value(Metric::Ph), 7.2);
        assert_eq!(reading.value(Metric::DissolvedOxygen), 6.8);
    }

    #[test]
    fn test_reading_serializes_with_rfc3339_timestamp() {
        let reading = Reading {
            id: 1,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            temperature: 25.0,
            ph: 7.0,
            dissolved_oxygen: 6.0,
        };
        let json = serde_json::to_value(&reading).expect("reading should serialize");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["dissolved_oxygen"], 6.0);
    }
}
