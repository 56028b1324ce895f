//! Getting readings into the store.
//!
//! Submodules:
//! - `simulate` — random pond readings for demos and development.

pub mod simulate;
