//! Sensor table rows and headline metrics for the dashboard.

use crate::model::{display_or_na, StationReading};

/// Sensors shown as headline metrics, in display order.
pub const HIGHLIGHTED_SENSORS: &[&str] = &["temperatura", "humedad", "PM25", "O3"];

/// One row of the sensor table, already rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRow {
    pub parameter: String,
    pub value: String,
    pub category: String,
    pub code: String,
    pub index: String,
}

/// A headline metric: label, value and the category shown as its hint.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub category: String,
}

/// One row per sensor, in document order.
pub fn sensor_rows(reading: &StationReading) -> Vec<SensorRow> {
    reading
        .sensors
        .iter()
        .map(|s| SensorRow {
            parameter: s.display_name(),
            value: display_or_na(&s.value),
            category: display_or_na(&s.category),
            code: display_or_na(&s.category_code),
            index: display_or_na(&s.index),
        })
        .collect()
}

/// Headline metrics for whichever of [`HIGHLIGHTED_SENSORS`] the station
/// reports.
pub fn highlighted_metrics(reading: &StationReading) -> Vec<Metric> {
    HIGHLIGHTED_SENSORS
        .iter()
        .filter_map(|key| reading.sensor(key))
        .map(|s| Metric {
            label: s.display_name(),
            value: display_or_na(&s.value),
            category: display_or_na(&s.category),
        })
        .collect()
}
