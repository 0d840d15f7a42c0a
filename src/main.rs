//! CLI entry point for the urban_layers data pipeline.
//!
//! Provides subcommands for refreshing the pollution layer (live endpoint
//! with cached fallback), capturing daily historical snapshots, pre-styling
//! bus route geometry, and querying the city-level air quality API.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use urban_layers::fetch::BasicClient;
use urban_layers::geojson_io;
use urban_layers::pollution::city_api::CityAirClient;
use urban_layers::pollution::{DEFAULT_LIVE_URL, PollutionFeed};
use urban_layers::routes::style_routes;
use urban_layers::snapshot;

#[derive(Parser)]
#[command(name = "urban_layers")]
#[command(about = "Data pipeline for the municipal open-data map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh current pollution data and write the map's GeoJSON layer
    UpdatePollution {
        /// Live endpoint queried first
        #[arg(long, default_value = DEFAULT_LIVE_URL)]
        live_url: String,

        /// Cached snapshot used when the live endpoint fails
        #[arg(long, default_value = "data/pollution.geojson")]
        fallback: PathBuf,

        /// Output GeoJSON file
        #[arg(short, long, default_value = "data/pollution.geojson")]
        output: PathBuf,
    },
    /// Capture today's pollution snapshot into the historical archive
    Snapshot {
        #[arg(long, default_value = DEFAULT_LIVE_URL)]
        live_url: String,

        #[arg(long, default_value = "data/pollution.geojson")]
        fallback: PathBuf,

        /// Directory holding snapshot files and index.json
        #[arg(short, long, default_value = "historical-pollution")]
        dir: PathBuf,
    },
    /// Offset and color bus routes so overlapping lines stay readable
    OffsetRoutes {
        /// Input bus routes FeatureCollection
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output styled FeatureCollection
        #[arg(short, long, default_value = "data/bus-routes-styled.geojson")]
        output: PathBuf,
    },
    /// Query the city-level air quality API for one coordinate
    CityAir {
        #[arg(long, default_value_t = 43.5138)]
        lat: f64,

        #[arg(long, default_value_t = -5.6535)]
        lon: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/urban_layers.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("urban_layers.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::UpdatePollution {
            live_url,
            fallback,
            output,
        } => update_pollution(&live_url, &fallback, &output).await?,
        Commands::Snapshot {
            live_url,
            fallback,
            dir,
        } => take_snapshot(&live_url, &fallback, &dir).await?,
        Commands::OffsetRoutes { input, output } => offset_routes(&input, &output)?,
        Commands::CityAir { lat, lon } => city_air(lat, lon).await?,
    }

    Ok(())
}

/// Refreshes the pollution feed and writes the current-data layer file.
#[tracing::instrument(skip_all, fields(live_url, output = %output.display()))]
async fn update_pollution(live_url: &str, fallback: &Path, output: &Path) -> Result<()> {
    let feed = PollutionFeed::new(BasicClient::new()?, live_url, fallback);
    let (stations, source) = feed.refresh().await?;

    let fc = geojson_io::stations_to_geojson(&stations);
    geojson_io::write_feature_collection(output, &fc)?;

    for station in &stations {
        info!(
            station = %station.name,
            level = station.aqi_level.as_str(),
            pm25 = station.pm25_avg,
            no2 = station.no2_avg,
            "station updated"
        );
    }
    info!(
        stations = stations.len(),
        source = ?source,
        output = %output.display(),
        "pollution layer written"
    );
    Ok(())
}

/// Refreshes the feed and archives today's snapshot with its index entry.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
async fn take_snapshot(live_url: &str, fallback: &Path, dir: &Path) -> Result<()> {
    let feed = PollutionFeed::new(BasicClient::new()?, live_url, fallback);
    let (stations, source) = feed.refresh().await?;

    let today = Utc::now().date_naive();
    let filename = snapshot::write_daily_snapshot(dir, &stations, today)?;

    info!(
        file = %filename,
        stations = stations.len(),
        source = ?source,
        "snapshot captured"
    );
    Ok(())
}

/// Reads bus route features, applies offsets and colors, writes the styled
/// collection the frontend renders directly.
#[tracing::instrument(fields(input = %input.display(), output = %output.display()))]
fn offset_routes(input: &Path, output: &Path) -> Result<()> {
    let fc = geojson_io::read_feature_collection(input)?;
    let routes = geojson_io::routes_from_geojson(&fc);

    if routes.is_empty() {
        warn!(input = %input.display(), "no line features found in input");
    }

    let styled = style_routes(&routes);
    let out_fc = geojson_io::styled_routes_to_geojson(&styled);
    geojson_io::write_feature_collection(output, &out_fc)?;

    info!(
        routes = styled.len(),
        output = %output.display(),
        "styled routes written"
    );
    Ok(())
}

/// Logs the city-level air quality sample for a coordinate. Silent no-op on
/// any failure; this source has no fallback.
#[tracing::instrument]
async fn city_air(lat: f64, lon: f64) -> Result<()> {
    let Ok(api_key) = std::env::var("CITY_AIR_API_KEY") else {
        warn!("CITY_AIR_API_KEY not set, skipping city air quality");
        return Ok(());
    };

    let client = CityAirClient::new(BasicClient::new()?, api_key);
    match client.nearest_city(lat, lon).await {
        Some(sample) => {
            info!(
                aqi_us = sample.aqi_us,
                level = sample.level(),
                pm25 = sample.pm25,
                temperature_c = sample.temperature_c,
                humidity_pct = sample.humidity_pct,
                "city air quality"
            );
        }
        None => {
            warn!("no city air quality data available");
        }
    }
    Ok(())
}
