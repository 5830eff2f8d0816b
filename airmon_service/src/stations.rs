/// Station directory for the air-quality dashboard.
///
/// Defines the canonical list of monitoring stations offered in the station
/// selector, with the municipality and region each one belongs to. This is
/// the single source of truth for station codes; the built-in list ships in
/// `stations.toml` and can be replaced by an operator-supplied file with the
/// same schema.

use crate::model::StationRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Built-in directory, compiled into the binary.
const BUILTIN_STATIONS: &str = include_str!("../stations.toml");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Could not read station file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid station file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Station directory is empty")]
    Empty,
    #[error("Duplicate station code {0} in directory")]
    DuplicateCode(u32),
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StationFile {
    #[serde(rename = "station", default)]
    stations: Vec<StationRecord>,
}

/// Immutable, ordered list of known stations.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<StationRecord>,
}

impl StationDirectory {
    /// The directory compiled into the binary.
    pub fn builtin() -> Result<Self, DirectoryError> {
        Self::from_toml_str(BUILTIN_STATIONS)
    }

    /// Loads a directory file with `[[station]]` entries.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, DirectoryError> {
        let file: StationFile = toml::from_str(text)?;
        Self::from_records(file.stations)
    }

    /// Builds a directory, rejecting empty lists and duplicate codes.
    pub fn from_records(stations: Vec<StationRecord>) -> Result<Self, DirectoryError> {
        if stations.is_empty() {
            return Err(DirectoryError::Empty);
        }
        let mut seen = HashSet::new();
        for station in &stations {
            if !seen.insert(station.code) {
                return Err(DirectoryError::DuplicateCode(station.code));
            }
        }
        Ok(StationDirectory { stations })
    }

    /// All stations, in directory order.
    pub fn all(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Looks up a station by numeric code.
    pub fn find(&self, code: u32) -> Option<&StationRecord> {
        self.stations.iter().find(|s| s.code == code)
    }

    /// Looks up a station by a code typed by the operator. Surrounding
    /// whitespace and leading zeros are ignored; non-numeric input is never
    /// found.
    pub fn find_by_code(&self, code: &str) -> Option<&StationRecord> {
        parse_station_code(code).and_then(|c| self.find(c))
    }
}

/// Parses an operator-supplied station code.
pub fn parse_station_code(code: &str) -> Option<u32> {
    code.trim().parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
