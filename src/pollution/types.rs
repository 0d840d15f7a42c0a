use serde::Serialize;

use super::aqi::AqiLevel;

/// One raw reading from the municipal payload, already coerced to plain
/// types at the boundary. Pollutant fields are `None` when the upstream
/// value was missing, empty, or unparsable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub date: Option<String>,
    pub period: i64,
}

/// Per-station accumulator, mutated only during the single grouping pass and
/// discarded once its [`StationSummary`] is produced.
#[derive(Debug, Default)]
pub(crate) struct Station {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub pm25: Vec<f64>,
    pub pm10: Vec<f64>,
    pub no2: Vec<f64>,
    pub o3: Vec<f64>,
    pub latest_date: Option<String>,
    pub latest_period: i64,
}

/// Normalized per-station result for one refresh cycle. Created fresh on
/// every successful fetch; never persisted across cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub pm25_avg: Option<f64>,
    pub pm10_avg: Option<f64>,
    pub no2_avg: Option<f64>,
    pub o3_avg: Option<f64>,
    pub aqi_score: Option<f64>,
    pub aqi_level: AqiLevel,
    pub is_stale: bool,
    /// `"{date} {HH}:00"` of the most recent reading, when one had a date.
    pub latest_reading: Option<String>,
}
