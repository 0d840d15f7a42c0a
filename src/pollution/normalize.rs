//! Grouping raw readings into per-station summaries.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use super::aqi::{self, AqiLevel};
use super::types::{RawReading, Station, StationSummary};

/// A station whose latest reading is older than this is considered inactive.
const STALE_AFTER_DAYS: i64 = 30;

/// Groups `readings` by station and derives one [`StationSummary`] each.
///
/// `today` is passed in (rather than read from the clock) so staleness is
/// testable; callers pass `Utc::now().date_naive()`. Output is ordered by
/// station id.
pub fn normalize(readings: &[RawReading], today: NaiveDate) -> Vec<StationSummary> {
    let mut stations: BTreeMap<String, Station> = BTreeMap::new();

    for reading in readings {
        let station = stations
            .entry(reading.station_id.clone())
            .or_insert_with(|| Station {
                name: reading.name.clone(),
                lat: reading.lat,
                lon: reading.lon,
                ..Station::default()
            });

        // Zero is how the upstream encodes "no measurement".
        push_value(&mut station.pm25, reading.pm25);
        push_value(&mut station.pm10, reading.pm10);
        push_value(&mut station.no2, reading.no2);
        push_value(&mut station.o3, reading.o3);

        if let Some(date) = &reading.date {
            let newer = match &station.latest_date {
                None => true,
                Some(latest) => {
                    date > latest || (date == latest && reading.period > station.latest_period)
                }
            };
            if newer {
                station.latest_date = Some(date.clone());
                station.latest_period = reading.period;
            }
        }
    }

    stations
        .into_iter()
        .map(|(id, station)| summarize(id, station, today))
        .collect()
}

fn push_value(values: &mut Vec<f64>, value: Option<f64>) {
    if let Some(v) = value {
        if v != 0.0 {
            values.push(v);
        }
    }
}

fn summarize(station_id: String, station: Station, today: NaiveDate) -> StationSummary {
    let pm25_avg = mean(&station.pm25);
    let pm10_avg = mean(&station.pm10);
    let no2_avg = mean(&station.no2);
    let o3_avg = mean(&station.o3);

    // An unparsable or absent date counts as fresh, matching the upstream
    // pipeline's lenient date handling.
    let is_stale = station
        .latest_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d < today - Duration::days(STALE_AFTER_DAYS))
        .unwrap_or(false);

    let (aqi_score, aqi_level) = if is_stale {
        (None, AqiLevel::Inactive)
    } else {
        let score = aqi::aqi_score(pm25_avg, pm10_avg, no2_avg);
        (score, AqiLevel::from_score(score))
    };

    let latest_reading = station
        .latest_date
        .as_ref()
        .map(|d| format!("{d} {:02}:00", station.latest_period));

    StationSummary {
        station_id,
        name: station.name,
        lat: station.lat,
        lon: station.lon,
        pm25_avg,
        pm10_avg,
        no2_avg,
        o3_avg,
        aqi_score,
        aqi_level,
        is_stale,
        latest_reading,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
