/// Structured logging for the station dashboard
///
/// Provides context-rich logging with station identifiers, timestamps,
/// and severity levels. Supports console output and an optional
/// append-only log file.

use crate::config::{ConfigError, LoggingConfig};
use crate::model::{AssistantError, FetchError, FetchErrorKind};
use chrono::Utc;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

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

impl std::str::FromStr for LogLevel {
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
// Log Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    StationApi,
    Assistant,
    Config,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::StationApi => write!(f, "API"),
            Source::Assistant => write!(f, "LLM"),
            Source::Config => write!(f, "CFG"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the operator can fix it (TLS toggle, wrong code)
    Expected,
    /// Unexpected failure - the remote service is degraded or has changed
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
// Sink
// ---------------------------------------------------------------------------

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

/// Console (stderr) plus an optional append-only file.
pub struct Logger {
    min_level: LogLevel,
    console_timestamps: bool,
    file: Option<(PathBuf, File)>,
}

impl Logger {
    /// Opens `file` for appending, creating it if needed.
    pub fn new(min_level: LogLevel, file: Option<&Path>, console_timestamps: bool) -> io::Result<Self> {
        let file = match file {
            Some(path) => {
                let handle = OpenOptions::new().create(true).append(true).open(path)?;
                Some((path.to_path_buf(), handle))
            }
            None => None,
        };
        Ok(Logger {
            min_level,
            console_timestamps,
            file,
        })
    }

    fn format_entry(level: LogLevel, source: &Source, station: Option<&str>, message: &str) -> String {
        let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!(
            "{} {} {}{}: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            level,
            source,
            station_part,
            message
        )
    }

    fn log(&mut self, level: LogLevel, source: &Source, station: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }
        let entry = Self::format_entry(level, source, station, message);

        // Console output goes to stderr; stdout belongs to the dashboard.
        if self.console_timestamps {
            eprintln!("{}", entry);
        } else {
            let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, station_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, station_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        if let Some((path, file)) = self.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", entry) {
                eprintln!("Could not append to log file {}: {}", path.display(), e);
            }
        }
    }
}

/// Installs the global logger described by the `[logging]` section.
pub fn init_logger(config: &LoggingConfig) -> Result<(), ConfigError> {
    let min_level = config.min_level()?;
    let logger = Logger::new(min_level, config.file.as_deref(), config.timestamps).map_err(|source| {
        ConfigError::Io {
            path: config
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            source,
        }
    })?;
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = Some(logger);
    }
    Ok(())
}

fn emit(level: LogLevel, source: Source, station: Option<&str>, message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            logger.log(level, &source, station, message);
        }
    }
}

pub fn info(source: Source, station: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, station, message);
}

pub fn warn(source: Source, station: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, station, message);
}

pub fn error(source: Source, station: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, station, message);
}

pub fn debug(source: Source, station: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, station, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a station fetch failure by its kind.
pub fn classify_fetch_failure(err: &FetchError) -> FailureType {
    match err.kind() {
        // The operator can fix these from the dashboard: toggle TLS off,
        // or pick a station code the API knows.
        FetchErrorKind::Tls => FailureType::Expected,
        FetchErrorKind::NonSuccessStatus => match err {
            FetchError::Status { code, .. } if *code == 404 => FailureType::Expected,
            _ => FailureType::Unexpected,
        },
        // A 200 that isn't JSON suggests the API changed
        FetchErrorKind::MalformedJson => FailureType::Unexpected,
        FetchErrorKind::Connection | FetchErrorKind::Timeout | FetchErrorKind::Unknown => {
            FailureType::Unknown
        }
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a station fetch failure with automatic classification
pub fn log_fetch_failure(station_code: &str, operation: &str, err: &FetchError) {
    let failure_type = classify_fetch_failure(err);

    let message = format!(
        "{} failed [{} {}]: {}",
        operation,
        err.kind(),
        failure_type,
        err
    );

    match failure_type {
        FailureType::Expected => debug(Source::StationApi, Some(station_code), &message),
        FailureType::Unexpected => error(Source::StationApi, Some(station_code), &message),
        FailureType::Unknown => warn(Source::StationApi, Some(station_code), &message),
    }
}

/// Log an assistant failure. Configuration problems are the operator's to
/// fix and only warn; everything else is an error.
pub fn log_assistant_failure(operation: &str, err: &AssistantError) {
    let message = format!("{} failed: {}", operation, err);
    if err.is_configuration() {
        warn(Source::Assistant, None, &message);
    } else {
        error(Source::Assistant, None, &message);
    }
}
