//! Station context for the assistant.
//!
//! Turns a station document into the plain-text block the assistant is
//! grounded on: general station information, current sensor measurements and
//! a fixed paragraph about the monitoring network. Formatting is total; any
//! missing or oddly-shaped field is written as [`NOT_AVAILABLE`].
//!
//! [`NOT_AVAILABLE`]: crate::model::NOT_AVAILABLE

use crate::model::{display_or_na, SensorMeasurement, StationReading};
use serde_json::Value;

pub const GENERAL_HEADING: &str = "INFORMACIÓN GENERAL DE LA ESTACIÓN:";
pub const COORDINATES_HEADING: &str = "COORDENADAS:";
pub const SENSORS_HEADING: &str = "MEDICIONES ACTUALES DE SENSORES:";
pub const NETWORK_HEADING: &str = "CONTEXTO ADICIONAL:";

const NETWORK_PARAGRAPH: &str = "Esta estación forma parte de la red de monitoreo ambiental de \
CORNARE y mide diversos parámetros\nde calidad del aire, condiciones meteorológicas y otros \
factores ambientales en tiempo real.";

/// Formats a raw station document.
pub fn format_context(document: &Value) -> String {
    format_reading(&StationReading::from_value(document))
}

/// Formats an already-parsed reading.
pub fn format_reading(reading: &StationReading) -> String {
    let mut text = String::new();

    text.push('\n');
    text.push_str(GENERAL_HEADING);
    text.push('\n');
    let general = [
        ("ID", &reading.id),
        ("Código", &reading.code),
        ("Municipio ID", &reading.municipality),
        ("Región", &reading.region),
        ("Ubicación", &reading.field_location),
        ("Red", &reading.network),
        ("Clasificación", &reading.classification),
        ("Corriente", &reading.stream),
        ("Etiqueta completa", &reading.label),
    ];
    for (label, field) in general {
        text.push_str(&format!("- {}: {}\n", label, display_or_na(field)));
    }

    text.push('\n');
    text.push_str(COORDINATES_HEADING);
    text.push('\n');
    text.push_str(&format!("- Latitud: {}\n", display_or_na(&reading.latitude)));
    text.push_str(&format!("- Longitud: {}\n", display_or_na(&reading.longitude)));

    text.push('\n');
    text.push_str(SENSORS_HEADING);
    text.push('\n');
    for sensor in &reading.sensors {
        text.push_str(&format_sensor(sensor));
    }

    text.push('\n');
    text.push_str(NETWORK_HEADING);
    text.push('\n');
    text.push_str(NETWORK_PARAGRAPH);
    text.push('\n');

    text
}

fn format_sensor(sensor: &SensorMeasurement) -> String {
    format!(
        "\n• {} ({}):\n  - Valor actual: {}\n  - Estado/Categoría: {}\n  - Código: {}\n  - Índice: {}\n",
        sensor.display_name(),
        sensor.sensor_type,
        display_or_na(&sensor.value),
        display_or_na(&sensor.category),
        display_or_na(&sensor.category_code),
        display_or_na(&sensor.index),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    /// Text between the sensor heading and the network heading.
    fn sensor_section(text: &str) -> &str {
        let start = text.find(SENSORS_HEADING).expect("sensor heading present") + SENSORS_HEADING.len();
        let end = text.find(NETWORK_HEADING).expect("network heading present");
        &text[start..end]
    }

    /// Sensor keys as rendered in the `• name (key):` lines.
    fn rendered_sensor_keys(text: &str) -> Vec<String> {
        sensor_section(text)
            .lines()
            .filter(|line| line.starts_with("• "))
            .filter_map(|line| {
                let open = line.rfind('(')?;
                let close = line.rfind("):")?;
                Some(line[open + 1..close].to_string())
            })
            .collect()
    }

    #[test]
    fn test_document_without_sensores_has_empty_sensor_section() {
        let text = format_context(&json!({"id": 1, "codigo": 204}));
        assert!(text.contains(GENERAL_HEADING));
        assert!(text.contains("- ID: 1"));
        assert!(sensor_section(&text).trim().is_empty());
    }

    #[test]
    fn test_non_object_document_formats_all_placeholders() {
        for doc in [json!(null), json!("texto"), json!([1, 2]), json!(42)] {
            let text = format_context(&doc);
            assert!(text.contains("- ID: N/A"), "doc {:?} gave:\n{}", doc, text);
            assert!(text.contains("- Latitud: N/A"));
            assert!(sensor_section(&text).trim().is_empty());
        }
    }

    #[test]
    fn test_sensores_not_a_mapping_is_an_empty_section() {
        let text = format_context(&json!({"sensores": "sin datos"}));
        assert!(sensor_section(&text).trim().is_empty());
    }

    #[test]
    fn test_every_sensor_appears_exactly_once() {
        let doc = json!({
            "sensores": {
                "PM25": {"parametro_nombre_corto": "PM2.5", "valor": 12},
                "O3": {"parametro_nombre_corto": "O3", "valor": 30},
                "temperatura": {"valor": 22.5},
                "ruido": "fuera de servicio"
            }
        });
        let text = format_context(&doc);
        let keys = rendered_sensor_keys(&text);
        let unique: HashSet<_> = keys.iter().cloned().collect();
        let expected: HashSet<_> = ["PM25", "O3", "temperatura", "ruido"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keys.len(), 4, "no sensor should be duplicated: {:?}", keys);
        assert_eq!(unique, expected);
    }

    #[test]
    fn test_station_204_scenario() {
        let doc = json!({
            "id": 88,
            "codigo": 204,
            "sensores": {
                "temperatura": {
                    "parametro_nombre_corto": "Temperatura",
                    "valor": 22.5,
                    "categoria_value": "Buena",
                    "codigo": 1,
                    "indice": 5
                }
            }
        });
        let text = format_context(&doc);
        assert!(text.contains("ID: "));
        assert!(text.contains("- Código: 204"));
        assert!(text.contains("22.5"));
        assert!(text.contains("Buena"));
    }

    #[test]
    fn test_missing_sensor_fields_use_placeholder_and_key_as_name() {
        let text = format_context(&json!({"sensores": {"humedad": {}}}));
        assert!(text.contains("• humedad (humedad):"));
        assert!(text.contains("  - Valor actual: N/A"));
        assert!(text.contains("  - Índice: N/A"));
    }

    #[test]
    fn test_general_fields_keep_stable_order() {
        let text = format_context(&json!({}));
        let labels = ["- ID:", "- Código:", "- Municipio ID:", "- Región:", "- Ubicación:",
            "- Red:", "- Clasificación:", "- Corriente:", "- Etiqueta completa:"];
        let positions: Vec<_> = labels
            .iter()
            .map(|l| text.find(l).unwrap_or_else(|| panic!("missing {}", l)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_network_paragraph_is_always_present() {
        let text = format_context(&json!({}));
        assert!(text.trim_end().ends_with("en tiempo real."));
    }
}
