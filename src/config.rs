//! Service configuration.
//!
//! Settings come from three places, later ones winning:
//!   1. built-in defaults
//!   2. an optional TOML file (`aquatrack.toml`, or a path given on the CLI)
//!   3. the environment, after loading `.env` with dotenv
//!
//! The Groq API key is only ever read from the environment (`GROQ_API_KEY`),
//! once, at start-up. A missing key is not an error; the advisor degrades.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::advisory::groq::{DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, GROQ_BASE_URL};
use crate::analysis::summary::DEFAULT_WINDOW;
use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "aquatrack.toml";
pub const DEFAULT_DATABASE_URL: &str = "aqua_track.db";

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub advisory: AdvisoryConfig,
    pub summary: SummaryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path, or a `postgres://` URL.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Environment only; never read from the TOML file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Number of recent readings summarized into the advisory context.
    pub window: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: DEFAULT_DATABASE_URL.to_string() }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), file: None, timestamps: false }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: String, source: std::io::Error },
    /// The config file is not valid TOML for this schema.
    Parse(toml::de::Error),
    /// A value parsed but is not acceptable.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Failed to read config {}: {}", path, source),
            ConfigError::Parse(e) => write!(f, "Invalid config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration for the running process.
    ///
    /// An explicit `path` must exist. Without one, `aquatrack.toml` in the
    /// working directory is used if present, and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        config
            .with_env(|key| std::env::var(key).ok())
            .validated()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(ConfigError::Parse)
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()) {
            self.database.url = url;
        }
        self.advisory.api_key = lookup(ENV_GROQ_API_KEY).filter(|v| !v.trim().is_empty());
        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.logging.min_level()?;
        if self.summary.window == 0 {
            return Err(ConfigError::Invalid("summary.window must be at least 1".to_string()));
        }
        if self.advisory.timeout_secs == 0 {
            return Err(ConfigError::Invalid("advisory.timeout_secs must be at least 1".to_string()));
        }
        Ok(self)
    }
}
