//! Water-safety alerting.
//!
//! Submodules:
//! - `thresholds` — SAFE/UNSAFE verdicts against the fish-pond limits.

pub mod thresholds;

pub use thresholds::{Verdict, Violation, evaluate_reading, evaluate_safety, first_violation};
