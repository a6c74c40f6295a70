//! Plain-text rendering of envelopes for terminal output.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::model::{ClimateReport, Envelope, SpeciesPage};

const MISSING: &str = "-";

/// Formats a species envelope, listing at most `limit` taxa.
pub fn format_species(envelope: &Envelope<SpeciesPage>, limit: usize) -> String {
    let page = match envelope {
        Envelope::Success(page) => page,
        Envelope::Failure(err) => return format!("Error: {err}\n"),
    };

    let mut output = format!("Species Search (GBIF)\nMatches: {}", page.count());
    if page.end_of_records() == Some(false) {
        output.push_str(" (more available)");
    }
    output.push_str("\n\n");

    if page.results().is_empty() {
        output.push_str("No species records found.\n");
        return output;
    }

    for (i, record) in page.results().iter().take(limit).enumerate() {
        let field = |key: &str| text_field(record, key);
        output.push_str(&format!(
            "{}. {}\n  Rank: {}\n  Kingdom: {}  Phylum: {}  Class: {}\n  Status: {}\n",
            i + 1,
            field("scientificName"),
            field("rank"),
            field("kingdom"),
            field("phylum"),
            field("class"),
            field("taxonomicStatus"),
        ));
    }

    let shown = page.results().len().min(limit);
    if page.results().len() > shown {
        output.push_str(&format!(
            "\n... {} more on this page\n",
            page.results().len() - shown
        ));
    }
    output
}

pub fn format_climate(envelope: &Envelope<ClimateReport>) -> String {
    let report = match envelope {
        Envelope::Success(report) => report,
        Envelope::Failure(err) => return format!("Error: {err}\n"),
    };

    let resolution = report.resolution();
    let mut output = format!(
        "Climate (Open-Meteo)\nLocation: {} ({:.2}, {:.2})\n",
        resolution.query, resolution.coordinates.lat, resolution.coordinates.lon
    );
    if resolution.is_fallback() {
        output.push_str("  Note: location not recognised, showing default coordinates\n");
    }
    if let Some(tz) = report.body().get("timezone").and_then(Value::as_str) {
        output.push_str(&format!("Timezone: {tz}\n"));
    }
    output.push('\n');

    match report.current_weather() {
        Some(current) => output.push_str(&format_current(current)),
        None => output.push_str("Current conditions unavailable.\n"),
    }
    output.push('\n');

    if let Some(daily) = report.daily() {
        output.push_str(&format_daily(daily));
    }
    output
}

fn format_current(current: &Map<String, Value>) -> String {
    let number = |key: &str| current.get(key).and_then(Value::as_f64);

    let mut output = String::from("Current Weather:\n");
    match number("temperature") {
        Some(t) => output.push_str(&format!("  Temperature: {t:.1}\u{00b0}C\n")),
        None => output.push_str(&format!("  Temperature: {MISSING}\n")),
    }
    if let Some(w) = number("windspeed") {
        output.push_str(&format!("  Wind Speed: {w:.1} km/h\n"));
    }
    if let Some(code) = current.get("weathercode").and_then(Value::as_i64) {
        output.push_str(&format!(
            "  Conditions: {}\n",
            weather_code_to_description(code)
        ));
    }
    if let Some(time) = current.get("time").and_then(Value::as_str) {
        output.push_str(&format!("  Observed: {}\n", format_timestamp(time)));
    }
    output
}

fn format_daily(daily: &Map<String, Value>) -> String {
    let column = |key: &str| daily.get(key).and_then(Value::as_array);

    let Some(days) = column("time") else {
        return String::new();
    };

    let max = column("temperature_2m_max");
    let min = column("temperature_2m_min");
    let rain = column("precipitation_sum");
    let cell = |col: Option<&Vec<Value>>, i: usize| {
        col.and_then(|c| c.get(i))
            .and_then(Value::as_f64)
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| MISSING.to_string())
    };

    let mut output = String::from("Daily Forecast:\n");
    for (i, day) in days.iter().enumerate() {
        let label = day.as_str().map(format_date).unwrap_or_else(|| MISSING.to_string());
        output.push_str(&format!(
            "  {}: {} / {} \u{00b0}C, precipitation {} mm\n",
            label,
            cell(min, i),
            cell(max, i),
            cell(rain, i),
        ));
    }
    output
}

fn text_field(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => MISSING.to_string(),
    }
}

/// `2024-01-01T12:00` style timestamps as returned with `timezone=auto`.
fn format_timestamp(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|dt| dt.format("%a %d %b %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn format_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%a %d %b").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Converts WMO weather code to human-readable description
fn weather_code_to_description(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 | 53 | 55 => "Drizzle",
        61 | 63 | 65 => "Rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}
