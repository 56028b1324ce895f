//! Data reduction for the pond monitoring service.
//!
//! Submodules:
//! - `summary` — rolls the most recent readings into mean/min/max per metric
//!   and renders the text context handed to the advisory prompt.

pub mod summary;

pub use summary::{DEFAULT_WINDOW, NO_DATA_CONTEXT, Summary, prepare_context, render_context, summarize};
