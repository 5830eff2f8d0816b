//! Air-quality status from the category labels stations report.
//!
//! Stations tag each measurement with a qualitative category ("Buena",
//! "Moderada", "Mala", ...). Labels are compared trimmed and
//! case-insensitively; anything not listed here is left unclassified.

use crate::model::StationReading;

/// Category labels that raise an alert.
pub const ALERT_CATEGORIES: &[&str] = &["mala", "muy mala", "dañina", "peligrosa", "naranja"];

/// Category labels considered in good standing.
pub const GOOD_CATEGORIES: &[&str] = &["buena", "moderada", "seguro"];

/// How many good-standing parameters the dashboard lists before summarising.
pub const GOOD_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStatus {
    Alert,
    Good,
    Unclassified,
}

/// Classifies one category label.
pub fn classify_category(label: &str) -> CategoryStatus {
    let normalized = label.trim().to_lowercase();
    if ALERT_CATEGORIES.contains(&normalized.as_str()) {
        CategoryStatus::Alert
    } else if GOOD_CATEGORIES.contains(&normalized.as_str()) {
        CategoryStatus::Good
    } else {
        CategoryStatus::Unclassified
    }
}

/// Parameters grouped by status, each entry rendered as `"name: category"`
/// with the category lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirQualitySummary {
    pub alerts: Vec<String>,
    pub good: Vec<String>,
}

impl AirQualitySummary {
    /// First [`GOOD_PREVIEW_LIMIT`] good entries and how many were left out.
    pub fn good_preview(&self) -> (&[String], usize) {
        let shown = self.good.len().min(GOOD_PREVIEW_LIMIT);
        (&self.good[..shown], self.good.len() - shown)
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty() && self.good.is_empty()
    }
}

/// Groups a reading's sensors by category status, in document order.
pub fn summarize(reading: &StationReading) -> AirQualitySummary {
    let mut summary = AirQualitySummary::default();
    for sensor in &reading.sensors {
        let Some(label) = sensor.category_label() else {
            continue;
        };
        let entry = format!("{}: {}", sensor.display_name(), label.trim().to_lowercase());
        match classify_category(&label) {
            CategoryStatus::Alert => summary.alerts.push(entry),
            CategoryStatus::Good => summary.good.push(entry),
            CategoryStatus::Unclassified => {}
        }
    }
    summary
}
