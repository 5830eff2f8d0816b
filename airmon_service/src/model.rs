//! Core data types for the station air-quality dashboard.
//!
//! This module defines the shared domain model imported by all other modules:
//! the station directory record, the typed view over a station API document,
//! the per-fetch snapshot and the error taxonomy of the two remote calls.
//! It performs no I/O.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Rendered in place of any field that is absent or has an unusable shape.
pub const NOT_AVAILABLE: &str = "N/A";

/// Maximum number of characters of a response body quoted in an error.
pub const BODY_SNIPPET_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Station directory
// ---------------------------------------------------------------------------

/// One entry of the static station directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationRecord {
    /// Numeric station code, as used in the station API path.
    pub code: u32,
    pub municipality: String,
    pub region: String,
}

// ---------------------------------------------------------------------------
// Station API document
// ---------------------------------------------------------------------------

/// A scalar JSON value as it appears in a station document.
///
/// The station API is loose about types (codes arrive as numbers or strings,
/// coordinates as floats or numeric strings), so fields keep whatever scalar
/// they were sent as and are rendered verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// Converts a JSON value into a scalar. Null, arrays and objects have no
    /// scalar form and yield `None`.
    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Int(i)),
                None => n.as_f64().map(Scalar::Float),
            },
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Numeric reading of the scalar; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// Integer reading of the scalar; integral floats and numeric strings
    /// are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            // `{:?}` keeps the fractional part of integral floats ("6.0").
            Scalar::Float(x) if x.is_finite() => write!(f, "{:?}", x),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Renders an optional field, substituting [`NOT_AVAILABLE`] when absent.
pub fn display_or_na(field: &Option<Scalar>) -> String {
    field
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// One sensor entry of a station document (`sensores.<type>`).
#[derive(Debug, Clone, PartialEq)]
pub struct SensorMeasurement {
    /// Key of the entry in the `sensores` mapping, e.g. `"PM25"`.
    pub sensor_type: String,
    pub short_name: Option<Scalar>,   // parametro_nombre_corto
    pub value: Option<Scalar>,        // valor
    pub category: Option<Scalar>,     // categoria_value, e.g. "Buena"
    pub category_code: Option<Scalar>, // codigo
    pub index: Option<Scalar>,        // indice
}

impl SensorMeasurement {
    /// Builds a measurement from the raw entry. Entries that are not JSON
    /// objects keep their key and have every other field unavailable.
    pub fn from_entry(sensor_type: &str, entry: &Value) -> Self {
        let empty = Map::new();
        let obj = entry.as_object().unwrap_or(&empty);
        SensorMeasurement {
            sensor_type: sensor_type.to_string(),
            short_name: scalar_field(obj, "parametro_nombre_corto"),
            value: scalar_field(obj, "valor"),
            category: scalar_field(obj, "categoria_value"),
            category_code: scalar_field(obj, "codigo"),
            index: scalar_field(obj, "indice"),
        }
    }

    /// Short parameter name, falling back to the sensor key.
    pub fn display_name(&self) -> String {
        self.short_name
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.sensor_type.clone())
    }

    /// Category label as text, if the station reported one.
    pub fn category_label(&self) -> Option<String> {
        self.category.as_ref().map(|c| c.to_string())
    }
}

/// Typed, read-only view over the JSON document returned for one station.
///
/// Every attribute is optional; absence (or an unusable shape) is recorded
/// as `None` and never treated as an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationReading {
    pub id: Option<Scalar>,
    pub code: Option<Scalar>,           // codigo
    pub municipality: Option<Scalar>,   // municipio (an ID in the API)
    pub region: Option<Scalar>,
    pub field_location: Option<Scalar>, // ubicacion_campo
    pub network: Option<Scalar>,        // red
    pub classification: Option<Scalar>, // clasificacion
    pub stream: Option<Scalar>,         // corriente
    pub label: Option<Scalar>,
    pub latitude: Option<Scalar>,  // latitud
    pub longitude: Option<Scalar>, // longitud
    /// Sensor entries in document order. Empty when `sensores` is missing
    /// or is not an object.
    pub sensors: Vec<SensorMeasurement>,
}

impl StationReading {
    /// Total conversion from any JSON value. A non-object document produces
    /// a reading with every field unavailable.
    pub fn from_value(document: &Value) -> Self {
        let Some(obj) = document.as_object() else {
            return StationReading::default();
        };

        let sensors = obj
            .get("sensores")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(key, entry)| SensorMeasurement::from_entry(key, entry))
                    .collect()
            })
            .unwrap_or_default();

        StationReading {
            id: scalar_field(obj, "id"),
            code: scalar_field(obj, "codigo"),
            municipality: scalar_field(obj, "municipio"),
            region: scalar_field(obj, "region"),
            field_location: scalar_field(obj, "ubicacion_campo"),
            network: scalar_field(obj, "red"),
            classification: scalar_field(obj, "clasificacion"),
            stream: scalar_field(obj, "corriente"),
            label: scalar_field(obj, "label"),
            latitude: scalar_field(obj, "latitud"),
            longitude: scalar_field(obj, "longitud"),
            sensors,
        }
    }

    /// Looks up a sensor by its key in the `sensores` mapping.
    pub fn sensor(&self, sensor_type: &str) -> Option<&SensorMeasurement> {
        self.sensors.iter().find(|s| s.sensor_type == sensor_type)
    }

    /// WGS84 `(latitude, longitude)` when both parse as finite numbers.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_ref()?.as_f64()?;
        let lon = self.longitude.as_ref()?.as_f64()?;
        if lat.is_finite() && lon.is_finite() {
            Some((lat, lon))
        } else {
            None
        }
    }
}

fn scalar_field(obj: &Map<String, Value>, key: &str) -> Option<Scalar> {
    obj.get(key).and_then(Scalar::from_value)
}

// ---------------------------------------------------------------------------
// Per-operation records
// ---------------------------------------------------------------------------

/// Successful outcome of one station fetch. Replaced wholesale by the next
/// fetch; never mutated.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    /// Station code exactly as it was requested.
    pub station_code: String,
    /// Raw document as received.
    pub document: Value,
    /// Typed view over `document`.
    pub reading: StationReading,
    /// Local time at which the fetch completed.
    pub fetched_at: DateTime<FixedOffset>,
}

impl StationSnapshot {
    pub fn new(station_code: &str, document: Value, fetched_at: DateTime<FixedOffset>) -> Self {
        let reading = StationReading::from_value(&document);
        StationSnapshot {
            station_code: station_code.to_string(),
            document,
            reading,
            fetched_at,
        }
    }
}

/// Result of one station fetch.
pub type FetchResult = Result<StationSnapshot, FetchError>;

/// One answered question. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantExchange {
    pub question: String,
    pub context: String,
    pub answer: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Tls,
    Connection,
    Timeout,
    NonSuccessStatus,
    MalformedJson,
    Unknown,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Tls => write!(f, "TLS"),
            FetchErrorKind::Connection => write!(f, "CONNECTION"),
            FetchErrorKind::Timeout => write!(f, "TIMEOUT"),
            FetchErrorKind::NonSuccessStatus => write!(f, "STATUS"),
            FetchErrorKind::MalformedJson => write!(f, "JSON"),
            FetchErrorKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Errors from a single station API fetch. None are retried and none are
/// fatal to the process.
#[derive(Debug, Error, PartialEq)]
pub enum FetchError {
    /// Certificate validation or TLS handshake failure.
    #[error(
        "TLS error: {0}. Fix: turn TLS certificate verification off (`tls off`) and fetch again."
    )]
    Tls(String),
    /// DNS resolution, refused or reset connection.
    #[error("Connection error: {0}. Check your internet connection.")]
    Connection(String),
    /// No response within the fetch timeout.
    #[error("Timeout: the station API took too long to respond. {0}")]
    Timeout(String),
    /// Any status other than 200. `snippet` holds at most
    /// [`BODY_SNIPPET_CHARS`] characters of the body.
    #[error("HTTP error {code}: {snippet}")]
    Status { code: u16, snippet: String },
    /// The body of a 200 response is not valid JSON.
    #[error("Could not decode JSON: {0}")]
    MalformedJson(String),
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Tls(_) => FetchErrorKind::Tls,
            FetchError::Connection(_) => FetchErrorKind::Connection,
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Status { .. } => FetchErrorKind::NonSuccessStatus,
            FetchError::MalformedJson(_) => FetchErrorKind::MalformedJson,
            FetchError::Unknown(_) => FetchErrorKind::Unknown,
        }
    }

    /// DNS, connection, TLS and timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            FetchErrorKind::Tls | FetchErrorKind::Connection | FetchErrorKind::Timeout
        )
    }

    /// The service answered, but not with a usable document.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self.kind(),
            FetchErrorKind::NonSuccessStatus | FetchErrorKind::MalformedJson
        )
    }
}

/// Errors from a single assistant question. None are retried.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// No usable credential was supplied; no request was sent.
    #[error("No API key configured for the assistant")]
    MissingCredential,
    /// The credential cannot be sent as an HTTP header value.
    #[error("Invalid API key: {0}")]
    InvalidCredential(String),
    /// The request failed or the response could not be parsed.
    #[error("Assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service returned a non-success status.
    #[error("Assistant service error: {1} (Status {0})")]
    Status(u16, String),
    /// The completion contained no text.
    #[error("Assistant returned no answer")]
    EmptyResponse,
}

impl AssistantError {
    /// Errors raised before anything was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AssistantError::MissingCredential | AssistantError::InvalidCredential(_)
        )
    }
}

/// Returns at most `max_chars` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
