//! Dashboard session state.
//!
//! The session holds the operator's choices (station, protocol, TLS toggle)
//! and the last successful snapshot. Each fetch is described by an explicit
//! [`FetchRequest`] built from the session; its result replaces the snapshot
//! wholesale on success and leaves it untouched on failure.

use crate::config::{Protocol, StationApiConfig};
use crate::ingest::estaciones::StationClient;
use crate::model::{FetchResult, StationSnapshot};
use chrono::FixedOffset;

/// Everything needed to perform one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub station_code: String,
    pub verify_tls: bool,
    pub protocol: Protocol,
}

impl FetchRequest {
    /// Performs the fetch against the configured base URL for `protocol`.
    pub fn execute(&self, api: &StationApiConfig, offset: FixedOffset) -> FetchResult {
        StationClient::from_config(api, self.protocol).fetch_snapshot(
            &self.station_code,
            self.verify_tls,
            offset,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub station_code: String,
    pub verify_tls: bool,
    pub protocol: Protocol,
    pub snapshot: Option<StationSnapshot>,
}

impl Session {
    pub fn from_config(api: &StationApiConfig) -> Self {
        Session {
            station_code: api.default_station.trim().to_string(),
            verify_tls: api.verify_tls,
            protocol: api.protocol,
            snapshot: None,
        }
    }

    /// Builds the request for `code`, or for the selected station when no
    /// code is given. Returns `None` when there is no station to fetch.
    pub fn fetch_request(&self, code: Option<&str>) -> Option<FetchRequest> {
        let station_code = code.unwrap_or(&self.station_code).trim();
        if station_code.is_empty() {
            return None;
        }
        Some(FetchRequest {
            station_code: station_code.to_string(),
            verify_tls: self.verify_tls,
            protocol: self.protocol,
        })
    }

    /// Records the outcome of a fetch. A success becomes the current
    /// snapshot and selects its station; a failure changes nothing.
    pub fn apply(&mut self, result: &FetchResult) {
        if let Ok(snapshot) = result {
            self.station_code = snapshot.station_code.clone();
            self.snapshot = Some(snapshot.clone());
        }
    }
}
