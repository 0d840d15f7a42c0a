//! Composite air-quality scoring and classification.

use serde::{Deserialize, Serialize};

/// EU limit values used as scale divisors, in μg/m³.
const PM25_LIMIT: f64 = 25.0;
const PM10_LIMIT: f64 = 50.0;
const NO2_LIMIT: f64 = 40.0;

/// Computes the composite score: each available pollutant contributes
/// `value / limit * 100`, and the score is the mean of the contributions.
/// `None` when no scored pollutant has a value (O₃ is reported but never
/// scored).
pub fn aqi_score(pm25: Option<f64>, pm10: Option<f64>, no2: Option<f64>) -> Option<f64> {
    let mut terms = Vec::new();

    if let Some(v) = pm25 {
        terms.push(v / PM25_LIMIT * 100.0);
    }
    if let Some(v) = pm10 {
        terms.push(v / PM10_LIMIT * 100.0);
    }
    if let Some(v) = no2 {
        terms.push(v / NO2_LIMIT * 100.0);
    }

    if terms.is_empty() {
        None
    } else {
        Some(terms.iter().sum::<f64>() / terms.len() as f64)
    }
}

/// Air-quality classification shown on the map.
///
/// | Score          | Level     |
/// |----------------|-----------|
/// | < 50           | Good      |
/// | < 75           | Moderate  |
/// | < 100          | Poor      |
/// | >= 100         | Very Poor |
///
/// An absent score classifies as `No data` rather than falling into the
/// worst band, and stations whose latest reading is stale are forced to
/// `Inactive` regardless of pollutant values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiLevel {
    Good,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Inactive,
    #[serde(rename = "No data")]
    NoData,
}

impl AqiLevel {
    /// Classifies a composite score. Boundary values land in the upper band
    /// (50 is already Moderate, 100 is already Very Poor).
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => AqiLevel::NoData,
            Some(s) if s < 50.0 => AqiLevel::Good,
            Some(s) if s < 75.0 => AqiLevel::Moderate,
            Some(s) if s < 100.0 => AqiLevel::Poor,
            Some(_) => AqiLevel::VeryPoor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
            AqiLevel::Inactive => "Inactive",
            AqiLevel::NoData => "No data",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Good" => Some(AqiLevel::Good),
            "Moderate" => Some(AqiLevel::Moderate),
            "Poor" => Some(AqiLevel::Poor),
            "Very Poor" => Some(AqiLevel::VeryPoor),
            "Inactive" => Some(AqiLevel::Inactive),
            "No data" => Some(AqiLevel::NoData),
            _ => None,
        }
    }

    /// Marker color used by the display layer.
    pub fn color(&self) -> &'static str {
        match self {
            AqiLevel::Good => "#22c55e",
            AqiLevel::Moderate => "#eab308",
            AqiLevel::Poor => "#f97316",
            AqiLevel::VeryPoor => "#ef4444",
            AqiLevel::Inactive | AqiLevel::NoData => "#9ca3af",
        }
    }
}
