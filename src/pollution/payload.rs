//! Boundary parsing of the municipal air-quality payload.
//!
//! The upstream wraps its readings in
//! `calidadairemediatemporales.calidadairemediatemporal` and mixes number
//! and string encodings for the same fields between portal revisions, so
//! readings are picked field-by-field out of generic JSON instead of a rigid
//! serde model. Shape problems surface here, not deep inside normalization.

use anyhow::{Context, Result};
use serde_json::Value;

use super::types::RawReading;

/// Extracts the reading array from a live payload.
///
/// # Errors
///
/// Returns an error when the wrapper keys are missing or not an array.
/// Individual readings without a station id or coordinates are dropped.
pub fn parse_readings(payload: &Value) -> Result<Vec<RawReading>> {
    let readings = payload
        .get("calidadairemediatemporales")
        .and_then(|v| v.get("calidadairemediatemporal"))
        .and_then(Value::as_array)
        .context("payload missing calidadairemediatemporales.calidadairemediatemporal array")?;

    Ok(readings.iter().filter_map(reading_from_json).collect())
}

fn reading_from_json(item: &Value) -> Option<RawReading> {
    Some(RawReading {
        station_id: text_value(&item["estacion"])?,
        name: text_value(&item["título"]).unwrap_or_default(),
        lat: numeric_value(&item["latitud"])?,
        lon: numeric_value(&item["longitud"])?,
        pm25: numeric_value(&item["pm25"]),
        pm10: numeric_value(&item["pm10"]),
        no2: numeric_value(&item["no2"]),
        o3: numeric_value(&item["o3"]),
        date: text_value(&item["fecha"]),
        period: period_value(&item["periodo"]),
    })
}

/// Accepts JSON numbers and numeric strings; empty strings and unparsable
/// values count as absent.
fn numeric_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn period_value(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
