//! Structured logging for the pond monitoring service.
//!
//! Provides levelled, component-tagged log lines with UTC timestamps.
//! Output goes to the console and, optionally, to an append-only log file.
//! Nothing is printed until `init_logger` has been called, which keeps
//! library use and tests quiet.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use crate::advisory::AdvisoryError;
use crate::store::StoreError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Store,
    Summary,
    Safety,
    Advisory,
    Simulator,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Store => write!(f, "STORE"),
            Component::Summary => write!(f, "SUMMARY"),
            Component::Safety => write!(f, "SAFETY"),
            Component::Advisory => write!(f, "ADVISORY"),
            Component::Simulator => write!(f, "SIM"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - rate limiting or a transient quota condition
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

fn logger_guard() -> MutexGuard<'static, Option<Logger>> {
    match LOGGER.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    fn log(&self, level: LogLevel, component: Component, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, component, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}: {}", component, message),
                LogLevel::Warning => eprintln!("   ⚠ {}: {}", component, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}: {}", component, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Single log line: `2024-05-01 12:00:00 UTC WARN ADVISORY: message`.
pub fn format_entry(level: LogLevel, component: Component, message: &str) -> String {
    format!(
        "{} {} {}: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        level,
        component,
        message
    )
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize (or replace) the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    *logger_guard() = Some(Logger {
        min_level,
        log_file: log_file.map(String::from),
        console_timestamps,
    });
}

fn log(level: LogLevel, component: Component, message: &str) {
    if let Some(logger) = logger_guard().as_ref() {
        logger.log(level, component, message);
    }
}

pub fn info(component: Component, message: &str) {
    log(LogLevel::Info, component, message);
}

pub fn warn(component: Component, message: &str) {
    log(LogLevel::Warning, component, message);
}

pub fn error(component: Component, message: &str) {
    log(LogLevel::Error, component, message);
}

pub fn debug(component: Component, message: &str) {
    log(LogLevel::Debug, component, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a chat-completion failure.
///
/// Rate limiting (429) is routine on free API tiers. Transport errors,
/// server errors, and auth rejections point at an outage or a bad key.
pub fn classify_advisory_failure(err: &AdvisoryError) -> FailureType {
    match err {
        AdvisoryError::Status { code: 429, .. } => FailureType::Expected,
        AdvisoryError::Status { code: 401 | 403, .. } => FailureType::Unexpected,
        AdvisoryError::Status { code, .. } if *code >= 500 => FailureType::Unexpected,
        AdvisoryError::Status { .. } => FailureType::Unknown,
        AdvisoryError::Http(_) => FailureType::Unexpected,
        AdvisoryError::MalformedResponse(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log an advisory failure at the level its classification calls for
pub fn log_advisory_failure(operation: &str, err: &AdvisoryError) {
    let failure_type = classify_advisory_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Advisory, &message),
        FailureType::Unexpected => error(Component::Advisory, &message),
        FailureType::Unknown => warn(Component::Advisory, &message),
    }
}

/// Log a store failure before it is handed back to the caller
pub fn log_store_failure(operation: &str, err: &StoreError) {
    error(Component::Store, &format!("{} failed: {}", operation, err));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!(" warn ".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        let quota = AdvisoryError::Status { code: 429, body: "rate limit".to_string() };
        assert_eq!(classify_advisory_failure(&quota), FailureType::Expected);

        let auth = AdvisoryError::Status { code: 401, body: "invalid api key".to_string() };
        assert_eq!(classify_advisory_failure(&auth), FailureType::Unexpected);

        let outage = AdvisoryError::Status { code: 503, body: String::new() };
        assert_eq!(classify_advisory_failure(&outage), FailureType::Unexpected);

        let bad_request = AdvisoryError::Status { code: 400, body: "model not found".to_string() };
        assert_eq!(classify_advisory_failure(&bad_request), FailureType::Unknown);

        let garbled = AdvisoryError::MalformedResponse("no choices".to_string());
        assert_eq!(classify_advisory_failure(&garbled), FailureType::Unknown);
    }

    #[test]
    fn test_format_entry_contains_level_component_and_message() {
        let entry = format_entry(LogLevel::Warning, Component::Advisory, "quota hit");
        assert!(entry.ends_with("WARN ADVISORY: quota hit"), "got '{}'", entry);
        assert!(entry.contains(" UTC "));
    }

    #[test]
    fn test_component_tags() {
        let tags: Vec<String> = [
            Component::Store,
            Component::Summary,
            Component::Safety,
            Component::Advisory,
            Component::Simulator,
            Component::System,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        assert_eq!(tags, ["STORE", "SUMMARY", "SAFETY", "ADVISORY", "SIM", "SYS"]);

        let entry = format_entry(LogLevel::Debug, Component::Summary, "summarizing 3 of up to 200 readings");
        assert!(entry.ends_with("DEBUG SUMMARY: summarizing 3 of up to 200 readings"), "got '{}'", entry);
    }

    #[test]
    fn test_file_sink_appends_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquatrack.log");
        let path_str = path.to_str().unwrap();

        Logger::append_to_file(path_str, "first").unwrap();
        Logger::append_to_file(path_str, "second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
