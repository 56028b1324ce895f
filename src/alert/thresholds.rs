//! Fish-safety threshold checking.
//!
//! A reading is SAFE only when all three metrics sit inside the pond limits:
//!   20 °C <= temperature <= 30 °C
//!   6.5   <= pH          <= 8.5
//!   dissolved oxygen     >= 5.0 mg/L
//!
//! Checks run in that order and the first failure is reported as the
//! `Violation`. The verdict itself doesn't depend on the order.

use std::fmt;

use crate::model::{Metric, Reading};

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Static limits a pond must stay within to be safe for fish.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyThresholds {
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub min_ph: f64,
    pub max_ph: f64,
    pub min_dissolved_oxygen_mg_l: f64,
}

pub const FISH_POND_THRESHOLDS: SafetyThresholds = SafetyThresholds {
    min_temperature_c: 20.0,
    max_temperature_c: 30.0,
    min_ph: 6.5,
    max_ph: 8.5,
    min_dissolved_oxygen_mg_l: 5.0,
};

/// SAFE/UNSAFE classification of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Unsafe,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Unsafe => write!(f, "UNSAFE"),
        }
    }
}

/// The first limit a reading broke, with the offending value.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub metric: Metric,
    pub value: f64,
}

impl Violation {
    /// Short corrective action shown next to an UNSAFE verdict.
    pub fn recommendation(&self) -> &'static str {
        match self.metric {
            Metric::Temperature => "Check shading, water exchange, and heaters to bring temperature back to 20–30 °C.",
            Metric::Ph => "Check pH buffering (liming or water exchange) to return to 6.5–8.5.",
            Metric::DissolvedOxygen => "Increase aeration immediately; dissolved oxygen is below 5.0 mg/L.",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of range: {}{}", self.metric, self.value, self.metric.unit())
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

impl SafetyThresholds {
    /// Returns the first violated limit, or `None` if every check passes.
    ///
    /// Written as negated "inside the range" tests so that NaN fails every
    /// check instead of slipping through a `<` comparison.
    pub fn first_violation(&self, temperature: f64, ph: f64, dissolved_oxygen: f64) -> Option<Violation> {
        if !(self.min_temperature_c <= temperature && temperature <= self.max_temperature_c) {
            return Some(Violation { metric: Metric::Temperature, value: temperature });
        }
        if !(self.min_ph <= ph && ph <= self.max_ph) {
            return Some(Violation { metric: Metric::Ph, value: ph });
        }
        if !(dissolved_oxygen >= self.min_dissolved_oxygen_mg_l) {
            return Some(Violation { metric: Metric::DissolvedOxygen, value: dissolved_oxygen });
        }
        None
    }

    pub fn evaluate(&self, temperature: f64, ph: f64, dissolved_oxygen: f64) -> Verdict {
        match self.first_violation(temperature, ph, dissolved_oxygen) {
            Some(_) => Verdict::Unsafe,
            None => Verdict::Safe,
        }
    }
}

/// Classify one set of values against the fish-pond limits.
pub fn evaluate_safety(temperature: f64, ph: f64, dissolved_oxygen: f64) -> Verdict {
    FISH_POND_THRESHOLDS.evaluate(temperature, ph, dissolved_oxygen)
}

pub fn first_violation(temperature: f64, ph: f64, dissolved_oxygen: f64) -> Option<Violation> {
    FISH_POND_THRESHOLDS.first_violation(temperature, ph, dissolved_oxygen)
}

pub fn evaluate_reading(reading: &Reading) -> Verdict {
    evaluate_safety(reading.temperature, reading.ph, reading.dissolved_oxygen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
