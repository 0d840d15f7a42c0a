//! Daily historical snapshots and the period index consumed by the
//! historical map view's time slider.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::geojson_io;
use crate::pollution::StationSummary;

/// Spanish month names, as the frontend displays them.
const MONTH_NAMES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

/// One entry in `index.json`. The index also carries weekly and monthly
/// entries produced by earlier backfills; this crate only writes daily ones
/// but must round-trip the rest untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub date: String,
    pub display: String,
    pub file: String,
    pub granularity: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// The `historical-pollution/index.json` document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PeriodIndex {
    pub total_periods: usize,
    pub periods: Vec<PeriodEntry>,
    #[serde(default)]
    pub granularity_summary: serde_json::Map<String, serde_json::Value>,
}

impl PeriodIndex {
    /// Loads the index, returning an empty one when the file does not exist
    /// yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid period index", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Inserts or replaces the entry for `entry.date`, keeping the list in
    /// chronological order.
    pub fn upsert(&mut self, entry: PeriodEntry) {
        if let Some(existing) = self.periods.iter_mut().find(|p| p.date == entry.date) {
            *existing = entry;
        } else {
            let pos = self
                .periods
                .iter()
                .position(|p| p.date > entry.date)
                .unwrap_or(self.periods.len());
            self.periods.insert(pos, entry);
        }
        self.total_periods = self.periods.len();
    }
}

/// Builds the daily index entry for `date`, pointing at `file`.
pub fn daily_entry(date: NaiveDate, file: String) -> PeriodEntry {
    PeriodEntry {
        date: date.format("%Y-%m-%d").to_string(),
        display: format!(
            "{} {} {}",
            date.day(),
            MONTH_NAMES[date.month0() as usize],
            date.year()
        ),
        file,
        granularity: "daily".to_string(),
        year: date.year(),
        month: date.month(),
        day: date.day(),
    }
}

/// Writes the snapshot file `pollution-YYYY-MM-DD.geojson` for `date` and
/// upserts the period index. Returns the snapshot filename.
pub fn write_daily_snapshot(
    dir: &Path,
    stations: &[StationSummary],
    date: NaiveDate,
) -> Result<String> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let filename = format!("pollution-{date_str}.geojson");

    let mut fc = geojson_io::stations_to_geojson(stations);
    for feature in &mut fc.features {
        if let Some(props) = feature.properties.as_mut() {
            props.insert("year".to_string(), json!(date.year()));
            props.insert("month".to_string(), json!(date.month()));
            props.insert("day".to_string(), json!(date.day()));
            props.insert("date".to_string(), json!(date_str.clone()));
        }
    }
    geojson_io::write_feature_collection(&dir.join(&filename), &fc)?;

    let index_path = dir.join("index.json");
    let mut index = PeriodIndex::load(&index_path)?;
    index.upsert(daily_entry(date, filename.clone()));
    index.save(&index_path)?;

    info!(
        file = %filename,
        stations = stations.len(),
        total_periods = index.total_periods,
        "daily snapshot written"
    );
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_entry_display_in_spanish() {
        let entry = daily_entry(date(2024, 5, 3), "pollution-2024-05-03.geojson".to_string());
        assert_eq!(entry.display, "3 Mayo 2024");
        assert_eq!(entry.date, "2024-05-03");
        assert_eq!(entry.granularity, "daily");
    }

    #[test]
    fn test_upsert_replaces_same_date() {
        let mut index = PeriodIndex::default();
        index.upsert(daily_entry(date(2024, 5, 3), "a.geojson".to_string()));
        index.upsert(daily_entry(date(2024, 5, 3), "b.geojson".to_string()));

        assert_eq!(index.total_periods, 1);
        assert_eq!(index.periods[0].file, "b.geojson");
    }

    #[test]
    fn test_upsert_keeps_chronological_order() {
        let mut index = PeriodIndex::default();
        index.upsert(daily_entry(date(2024, 5, 5), "c.geojson".to_string()));
        index.upsert(daily_entry(date(2024, 5, 1), "a.geojson".to_string()));
        index.upsert(daily_entry(date(2024, 5, 3), "b.geojson".to_string()));

        let dates: Vec<_> = index.periods.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, ["2024-05-01", "2024-05-03", "2024-05-05"]);
        assert_eq!(index.total_periods, 3);
    }

    #[test]
    fn test_index_round_trip_preserves_foreign_granularities() {
        let raw = r#"{
            "total_periods": 1,
            "periods": [{
                "date": "2023-01-01",
                "display": "Enero 2023",
                "file": "pollution-2023-01.geojson",
                "granularity": "monthly",
                "year": 2023,
                "month": 1,
                "day": 1
            }],
            "granularity_summary": { "monthly": 1 }
        }"#;

        let mut index: PeriodIndex = serde_json::from_str(raw).unwrap();
        index.upsert(daily_entry(date(2024, 5, 3), "d.geojson".to_string()));

        assert_eq!(index.total_periods, 2);
        assert_eq!(index.periods[0].granularity, "monthly");
        assert_eq!(index.granularity_summary["monthly"], json!(1));
    }
}
