//! Live-with-fallback retrieval policy for the pollution layer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::fetch::{HttpClient, fetch_json};
use crate::geojson_io;

use super::normalize::normalize;
use super::payload;
use super::types::StationSummary;

/// Municipal open-data endpoint for air-quality readings. Public, no key.
pub const DEFAULT_LIVE_URL: &str = "https://opendata.gijon.es/descargar.php?id=1&tipo=JSON";

/// Where a refresh's stations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Cached,
}

/// Two-state retrieval policy: try the live endpoint once, fall back to the
/// cached snapshot once, and treat both failing as terminal for the cycle.
/// No retries, no backoff.
pub struct PollutionFeed<C> {
    client: C,
    live_url: String,
    fallback_path: PathBuf,
}

impl<C: HttpClient> PollutionFeed<C> {
    pub fn new(client: C, live_url: impl Into<String>, fallback_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            live_url: live_url.into(),
            fallback_path: fallback_path.into(),
        }
    }

    /// Refreshes the station summaries.
    ///
    /// # Errors
    ///
    /// Fails only when the live endpoint *and* the cached snapshot both
    /// fail; the caller then leaves the layer empty.
    pub async fn refresh(&self) -> Result<(Vec<StationSummary>, DataSource)> {
        match self.fetch_live(Utc::now().date_naive()).await {
            Ok(stations) => {
                info!(stations = stations.len(), "live pollution data loaded");
                Ok((stations, DataSource::Live))
            }
            Err(e) => {
                warn!(error = %e, "live endpoint failed, falling back to cached snapshot");
                let stations = self
                    .load_fallback()
                    .context("both live endpoint and cached snapshot failed")?;
                info!(stations = stations.len(), "cached pollution snapshot loaded");
                Ok((stations, DataSource::Cached))
            }
        }
    }

    async fn fetch_live(&self, today: NaiveDate) -> Result<Vec<StationSummary>> {
        let json = fetch_json(&self.client, &self.live_url).await?;
        let readings = payload::parse_readings(&json)?;
        Ok(normalize(&readings, today))
    }

    fn load_fallback(&self) -> Result<Vec<StationSummary>> {
        let fc = geojson_io::read_feature_collection(&self.fallback_path)?;
        geojson_io::stations_from_geojson(&fc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::env;
    use std::fs;
    use std::path::Path;

    /// Always fails at the transport level, forcing the fallback path.
    struct DownClient;

    #[async_trait]
    impl HttpClient for DownClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            // An unroutable local port; connection is refused immediately.
            let _ = req;
            reqwest::Client::new()
                .get("http://127.0.0.1:9/")
                .send()
                .await
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        Path::new(&env::temp_dir()).join(name)
    }

    #[tokio::test]
    async fn test_falls_back_to_cached_snapshot() {
        let path = temp_path("urban_layers_feed_fallback.geojson");
        fs::write(
            &path,
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {
                        "station_id": "1",
                        "name": "Estación Avenida Constitución",
                        "pm25_avg": 12.0,
                        "aqi_score": 48.0,
                        "aqi_level": "Good"
                    },
                    "geometry": { "type": "Point", "coordinates": [-5.673428, 43.529806] }
                }]
            }"#,
        )
        .unwrap();

        let feed = PollutionFeed::new(DownClient, "http://127.0.0.1:9/live", &path);
        let (stations, source) = feed.refresh().await.unwrap();

        assert_eq!(source, DataSource::Cached);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_id, "1");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_both_sources_failing_is_terminal() {
        let feed = PollutionFeed::new(
            DownClient,
            "http://127.0.0.1:9/live",
            temp_path("urban_layers_feed_missing.geojson"),
        );

        assert!(feed.refresh().await.is_err());
    }
}
