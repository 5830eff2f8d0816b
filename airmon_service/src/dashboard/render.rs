//! Text rendering for the terminal dashboard.
//!
//! Every function returns a `String`; printing is left to the binary.

use super::session::Session;
use crate::alert::categories::summarize;
use crate::analysis::sensors::{highlighted_metrics, sensor_rows, SensorRow};
use crate::assistant::prompts::SUGGESTED_QUESTIONS;
use crate::model::{display_or_na, AssistantExchange, StationRecord, StationSnapshot};
use crate::stations::StationDirectory;
use serde_json::Value;

const RULE: &str = "────────────────────────────────────────────────────────────";

pub fn render_banner() -> String {
    format!(
        "🌡️  Consulta de Estaciones Meteorológicas CORNARE\n\
         Query station data and ask questions about it.\n{}",
        RULE
    )
}

/// Usage instructions.
pub fn render_help() -> String {
    [
        "📋 Commands",
        "  stations              list the station directory",
        "  select <code>         choose the station to fetch",
        "  fetch [code]          fetch the selected (or given) station",
        "  tls on|off            toggle TLS certificate verification",
        "  protocol https|http   choose the station API base URL",
        "  show                  show the last fetched station",
        "  json                  show the raw JSON of the last fetch",
        "  suggest               list suggested questions",
        "  ask <question>        ask the assistant about the station",
        "  ask #<n>              ask suggested question number n",
        "  key <api key>         use an API key for this session",
        "  quit                  leave",
        "",
        "🚀 Typical use: keep TLS verification off, `fetch 204`, then `ask #1`.",
        "⚠️  If you see TLS errors, run `tls off`; the station API certificate",
        "    does not validate from most HTTP clients.",
    ]
    .join("\n")
}

/// TLS toggle state with the matching advice.
pub fn render_tls_status(verify_tls: bool) -> String {
    if verify_tls {
        "🔒 TLS verification on - if fetches fail with TLS errors, run `tls off`".to_string()
    } else {
        "✅ TLS verification off - fetches should connect".to_string()
    }
}

pub fn render_settings(session: &Session, credential_source: Option<&str>) -> String {
    let assistant = match credential_source {
        Some(source) => format!("enabled ({})", source),
        None => "disabled - no API key (use `key <api key>` or set it in .env)".to_string(),
    };
    format!(
        "⚙️  Station: {}   Protocol: {}\n{}\n🤖 Assistant: {}",
        session.station_code,
        session.protocol,
        render_tls_status(session.verify_tls),
        assistant
    )
}

pub fn render_directory(directory: &StationDirectory, selected: &str) -> String {
    let mut lines = vec![format!("🏢 Stations ({})", directory.len())];
    let selected = crate::stations::parse_station_code(selected);
    for station in directory.all() {
        let marker = if Some(station.code) == selected { "▶" } else { " " };
        lines.push(format!(
            " {} {:>5}  {} ({})",
            marker, station.code, station.municipality, station.region
        ));
    }
    lines.join("\n")
}

/// OpenStreetMap link centred on the station.
pub fn map_link(lat: f64, lon: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=12/{lat}/{lon}",
        lat = lat,
        lon = lon
    )
}

/// Full station view: general data, location, sensors, headline metrics and
/// air-quality status.
pub fn render_snapshot(snapshot: &StationSnapshot, record: Option<&StationRecord>) -> String {
    let reading = &snapshot.reading;
    let mut out = Vec::new();

    out.push(format!("📊 Station {}", snapshot.station_code));
    out.push(format!(
        "   fetched {}",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S (UTC%:z)")
    ));
    if let Some(record) = record {
        out.push(format!("   {} · {}", record.municipality, record.region));
    }

    out.push(String::new());
    out.push("ℹ️  General".to_string());
    out.push(format!("   ID:             {}", display_or_na(&reading.id)));
    out.push(format!("   Código:         {}", display_or_na(&reading.code)));
    out.push(format!("   Ubicación:      {}", display_or_na(&reading.field_location)));
    out.push(format!("   Red:            {}", display_or_na(&reading.network)));
    out.push(format!("   Clasificación:  {}", display_or_na(&reading.classification)));

    out.push(String::new());
    out.push("🗺️  Location".to_string());
    out.push(format!("   Latitud:        {}", display_or_na(&reading.latitude)));
    out.push(format!("   Longitud:       {}", display_or_na(&reading.longitude)));
    match reading.coordinates() {
        Some((lat, lon)) => out.push(format!("   Map:            {}", map_link(lat, lon))),
        None if reading.latitude.is_some() || reading.longitude.is_some() => {
            out.push("   (coordinates not valid for a map)".to_string())
        }
        None => {}
    }

    let rows = sensor_rows(reading);
    if !rows.is_empty() {
        out.push(String::new());
        out.push("🔬 Sensors".to_string());
        out.push(render_sensor_table(&rows));

        let metrics = highlighted_metrics(reading);
        if !metrics.is_empty() {
            out.push(String::new());
            out.push("📊 Highlights".to_string());
            for metric in metrics {
                out.push(format!(
                    "   {:<14} {:>10}   ({})",
                    metric.label, metric.value, metric.category
                ));
            }
        }

        let summary = summarize(reading);
        if !summary.is_empty() {
            out.push(String::new());
            out.push("⚠️  Air quality".to_string());
            if !summary.alerts.is_empty() {
                out.push("   🚨 Parameters with alerts:".to_string());
                for item in &summary.alerts {
                    out.push(format!("      - {}", item));
                }
            }
            let (good, remaining) = summary.good_preview();
            if !good.is_empty() {
                out.push("   ✅ Parameters in good standing:".to_string());
                for item in good {
                    out.push(format!("      - {}", item));
                }
                if remaining > 0 {
                    out.push(format!("      ... and {} more", remaining));
                }
            }
        }
    }

    out.join("\n")
}

/// Fixed-width sensor table; widths are measured in characters.
pub fn render_sensor_table(rows: &[SensorRow]) -> String {
    let headers = ["Parámetro", "Valor", "Categoría", "Código", "Índice"];
    let cells: Vec<[&str; 5]> = rows
        .iter()
        .map(|r| [
            r.parameter.as_str(),
            r.value.as_str(),
            r.category.as_str(),
            r.code.as_str(),
            r.index.as_str(),
        ])
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |fields: &[&str; 5]| {
        let padded: Vec<String> = fields
            .iter()
            .zip(widths)
            .map(|(field, width)| pad(field, width))
            .collect();
        format!("   {}", padded.join("  ").trim_end())
    };

    let mut out = vec![line(&headers)];
    out.push(format!(
        "   {}",
        widths.map(|w| "─".repeat(w)).join("  ")
    ));
    for row in &cells {
        out.push(line(row));
    }
    out.join("\n")
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.chars().count());
    format!("{}{}", text, " ".repeat(fill))
}

pub fn render_raw_json(document: &Value) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

pub fn render_suggestions() -> String {
    let mut lines = vec!["💡 Suggested questions (ask #<n>)".to_string()];
    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
        lines.push(format!("  {:>2}. {}", i + 1, question));
    }
    lines.join("\n")
}

pub fn render_answer(exchange: &AssistantExchange) -> String {
    format!("❓ {}\n\n💡 {}", exchange.question, exchange.answer)
}

pub fn render_error(message: &str) -> String {
    format!("❌ {}", message)
}
