//! Service configuration.
//!
//! Settings come from an optional TOML file (`airmon.toml` by default).
//! Every key has a default, so a missing file is not an error; a file that
//! exists but does not parse or validate is. The only environment variable
//! read is the assistant credential (see `assistant::credentials`), loaded
//! through `dotenv` at startup.

use crate::logging::LogLevel;
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "airmon.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Which of the two station API base URLs to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Https,
    Http,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Https => write!(f, "https"),
            Protocol::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "https" => Ok(Protocol::Https),
            "http" => Ok(Protocol::Http),
            other => Err(format!("unknown protocol '{}', expected https or http", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StationApiConfig {
    pub https_base_url: String,
    pub http_base_url: String,
    pub protocol: Protocol,
    /// Certificate validation is off by default: the station API's
    /// certificate chain does not validate from most client stacks.
    pub verify_tls: bool,
    pub timeout_secs: u64,
    pub default_station: String,
}

impl Default for StationApiConfig {
    fn default() -> Self {
        StationApiConfig {
            https_base_url: "https://marco.cornare.gov.co/api/v1/estaciones".to_string(),
            http_base_url: "http://marco.cornare.gov.co/api/v1/estaciones".to_string(),
            protocol: Protocol::Https,
            verify_tls: false,
            timeout_secs: 20,
            default_station: "204".to_string(),
        }
    }
}

impl StationApiConfig {
    pub fn base_url(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Https => &self.https_base_url,
            Protocol::Http => &self.http_base_url,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Optional file whose trimmed contents are the API key.
    pub api_key_file: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1200,
            temperature: 0.3,
            timeout_secs: 60,
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key_file: None,
        }
    }
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset from UTC used for fetch timestamps. Colombia is UTC-5.
    pub utc_offset_hours: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { utc_offset_hours: -5 }
    }
}

impl DisplayConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "utc_offset_hours {} is out of range",
                self.utc_offset_hours
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub station_api: StationApiConfig,
    pub assistant: AssistantConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
    /// Replaces the built-in station directory when set.
    pub stations_file: Option<PathBuf>,
}

impl Config {
    /// Loads the config file at `path`, or the defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.station_api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("station_api.timeout_secs must be > 0".into()));
        }
        if self.assistant.timeout_secs == 0 {
            return Err(ConfigError::Invalid("assistant.timeout_secs must be > 0".into()));
        }
        if self.assistant.max_tokens == 0 {
            return Err(ConfigError::Invalid("assistant.max_tokens must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.assistant.temperature) {
            return Err(ConfigError::Invalid(format!(
                "assistant.temperature {} is outside 0.0..=2.0",
                self.assistant.temperature
            )));
        }
        if !(-12..=14).contains(&self.display.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "display.utc_offset_hours {} is outside -12..=14",
                self.display.utc_offset_hours
            )));
        }
        self.logging.min_level()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
