//! City-level air quality from the third-party nearest-city API.
//!
//! A single reading for the whole city, keyed by URL query parameter. This
//! source has no fallback: any failure is a silent no-op and the layer just
//! stays empty.

use anyhow::Result;
use tracing::warn;

use crate::fetch::{HttpClient, UrlParam, fetch_json};

/// A city-level sample, on the US AQI scale (unlike the per-station EU
/// scoring in [`crate::pollution::aqi`]).
#[derive(Debug, Clone, PartialEq)]
pub struct CityAirSample {
    pub aqi_us: i64,
    pub pm25: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
}

impl CityAirSample {
    /// US AQI band label; bands are inclusive on the upper bound.
    pub fn level(&self) -> &'static str {
        match self.aqi_us {
            i64::MIN..=50 => "Good",
            51..=100 => "Moderate",
            101..=150 => "Unhealthy for Sensitive",
            _ => "Unhealthy",
        }
    }

    /// Marker color for the band.
    pub fn color(&self) -> &'static str {
        match self.aqi_us {
            i64::MIN..=50 => "#22c55e",
            51..=100 => "#eab308",
            101..=150 => "#f97316",
            _ => "#ef4444",
        }
    }
}

pub struct CityAirClient<C> {
    client: UrlParam<C>,
    base_url: String,
}

impl<C: HttpClient> CityAirClient<C> {
    pub fn new(inner: C, api_key: String) -> Self {
        Self {
            client: UrlParam {
                inner,
                param_name: "key".to_string(),
                key: api_key,
            },
            base_url: "https://api.airvisual.com/v2/nearest_city".to_string(),
        }
    }

    /// Fetches the sample nearest to a coordinate. Transport errors, non-2xx
    /// statuses, a non-"success" payload status, and unexpected shapes all
    /// come back as `None` with a warning logged.
    pub async fn nearest_city(&self, lat: f64, lon: f64) -> Option<CityAirSample> {
        match self.try_nearest_city(lat, lon).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "city air quality fetch failed");
                None
            }
        }
    }

    async fn try_nearest_city(&self, lat: f64, lon: f64) -> Result<Option<CityAirSample>> {
        let url = format!("{}?lat={lat}&lon={lon}", self.base_url);
        let json = fetch_json(&self.client, &url).await?;

        if json["status"].as_str() != Some("success") {
            return Ok(None);
        }

        let current = &json["data"]["current"];
        let Some(aqi_us) = current["pollution"]["aqius"].as_i64() else {
            return Ok(None);
        };

        Ok(Some(CityAirSample {
            aqi_us,
            pm25: current["pollution"]["pm25"].as_f64(),
            temperature_c: current["weather"]["tp"].as_f64(),
            humidity_pct: current["weather"]["hu"].as_f64(),
        }))
    }
}
