//! AquaTrack: fish-pond water-quality monitoring.
//!
//! Readings (temperature, pH, dissolved oxygen) are stored in a single
//! `sensor_data` table, summarized over a rolling window, classified
//! SAFE/UNSAFE against static fish-pond limits, and optionally handed to a
//! language model together with a user's question.
//!
//! Modules, leaf-first:
//! - `model`     — `Reading` and `Metric`
//! - `store`     — SQLite / PostgreSQL reading store
//! - `analysis`  — rolling-window summary and advisory context
//! - `alert`     — safety thresholds and verdicts
//! - `advisory`  — Groq-backed question answering
//! - `ingest`    — simulated sensor data
//! - `config`    — TOML + environment configuration
//! - `logging`   — structured console/file logging

pub mod advisory;
pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod store;
