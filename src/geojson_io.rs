//! GeoJSON boundary: every input and output of this crate is a
//! FeatureCollection, matching the files the map frontend consumes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo_types::{Coord, LineString, MultiLineString};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject};
use serde_json::json;

use crate::pollution::StationSummary;
use crate::pollution::aqi::AqiLevel;
use crate::routes::{RouteFeature, RouteGeometry, StyledRoute};

pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("{} is not valid GeoJSON", path.display()))?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => anyhow::bail!("{} is not a FeatureCollection", path.display()),
    }
}

pub fn write_feature_collection(path: &Path, fc: &FeatureCollection) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(fc)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Extracts route features from a bus-routes FeatureCollection.
///
/// The line id comes from the `line` property, falling back to `ref`, else
/// empty (which colors neutral gray downstream). Features that are not
/// LineString/MultiLineString are skipped.
pub fn routes_from_geojson(fc: &FeatureCollection) -> Vec<RouteFeature> {
    fc.features
        .iter()
        .filter_map(|feature| {
            let geometry = route_geometry(feature.geometry.as_ref()?)?;
            let line_id = feature
                .properties
                .as_ref()
                .and_then(|props| {
                    props
                        .get("line")
                        .or_else(|| props.get("ref"))
                        .and_then(|v| v.as_str())
                })
                .unwrap_or_default()
                .to_string();

            Some(RouteFeature { line_id, geometry })
        })
        .collect()
}

fn route_geometry(geometry: &Geometry) -> Option<RouteGeometry> {
    match &geometry.value {
        geojson::Value::LineString(positions) => {
            Some(RouteGeometry::Line(line_from_positions(positions)?))
        }
        geojson::Value::MultiLineString(parts) => {
            let lines = parts
                .iter()
                .map(|p| line_from_positions(p))
                .collect::<Option<Vec<_>>>()?;
            Some(RouteGeometry::MultiLine(MultiLineString::new(lines)))
        }
        _ => None,
    }
}

fn line_from_positions(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

/// Serializes styled routes for the rendering boundary.
pub fn styled_routes_to_geojson(routes: &[StyledRoute]) -> FeatureCollection {
    let features = routes
        .iter()
        .map(|route| {
            let geometry = match &route.geometry {
                RouteGeometry::Line(line) => Geometry::from(line),
                RouteGeometry::MultiLine(multi) => Geometry::from(multi),
            };

            let mut props = JsonObject::new();
            props.insert("line".to_string(), json!(route.line_id.clone()));
            props.insert("color".to_string(), json!(route.color.clone()));
            props.insert("offset_px".to_string(), json!(route.offset_pixels));

            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Serializes station summaries in the shape the frontend popup code reads
/// (and the fallback snapshot stores). Averages are rounded to one decimal.
pub fn stations_to_geojson(stations: &[StationSummary]) -> FeatureCollection {
    let features = stations
        .iter()
        .map(|station| {
            let mut props = JsonObject::new();
            props.insert("station_id".to_string(), json!(station.station_id.clone()));
            props.insert("name".to_string(), json!(station.name.clone()));
            props.insert("pm25_avg".to_string(), json!(station.pm25_avg.map(round1)));
            props.insert("pm10_avg".to_string(), json!(station.pm10_avg.map(round1)));
            props.insert("no2_avg".to_string(), json!(station.no2_avg.map(round1)));
            props.insert("o3_avg".to_string(), json!(station.o3_avg.map(round1)));
            props.insert(
                "aqi_score".to_string(),
                json!(station.aqi_score.map(round1)),
            );
            props.insert("aqi_level".to_string(), json!(station.aqi_level.as_str()));
            props.insert("color".to_string(), json!(station.aqi_level.color()));
            props.insert(
                "latest_reading".to_string(),
                json!(station.latest_reading.clone()),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::Point(vec![
                    station.lon,
                    station.lat,
                ]))),
                id: None,
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Parses a snapshot FeatureCollection back into station summaries.
///
/// Tolerant of absent optional properties; features without a point
/// geometry or station id are skipped. Staleness is derived from the
/// `Inactive` level, which is all the snapshot records.
pub fn stations_from_geojson(fc: &FeatureCollection) -> Result<Vec<StationSummary>> {
    let stations = fc
        .features
        .iter()
        .filter_map(station_from_feature)
        .collect();
    Ok(stations)
}

fn station_from_feature(feature: &Feature) -> Option<StationSummary> {
    let (lon, lat) = match &feature.geometry.as_ref()?.value {
        geojson::Value::Point(pos) => match pos.as_slice() {
            [x, y, ..] => (*x, *y),
            _ => return None,
        },
        _ => return None,
    };

    let props = feature.properties.as_ref()?;
    let station_id = match props.get("station_id")? {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let aqi_level = props
        .get("aqi_level")
        .and_then(|v| v.as_str())
        .and_then(AqiLevel::parse)
        .unwrap_or(AqiLevel::NoData);

    Some(StationSummary {
        station_id,
        name: props
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        lat,
        lon,
        pm25_avg: prop_f64(props, "pm25_avg"),
        pm10_avg: prop_f64(props, "pm10_avg"),
        no2_avg: prop_f64(props, "no2_avg"),
        o3_avg: prop_f64(props, "o3_avg"),
        aqi_score: prop_f64(props, "aqi_score"),
        aqi_level,
        is_stale: aqi_level == AqiLevel::Inactive,
        latest_reading: props
            .get("latest_reading")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

fn prop_f64(props: &JsonObject, key: &str) -> Option<f64> {
    props.get(key).and_then(|v| v.as_f64())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> StationSummary {
        StationSummary {
            station_id: "1".to_string(),
            name: "Estación Avenida Constitución".to_string(),
            lat: 43.529806,
            lon: -5.673428,
            pm25_avg: Some(12.34),
            pm10_avg: None,
            no2_avg: Some(30.0),
            o3_avg: None,
            aqi_score: Some(62.18),
            aqi_level: AqiLevel::Moderate,
            is_stale: false,
            latest_reading: Some("2024-05-10 09:00".to_string()),
        }
    }

    #[test]
    fn test_station_roundtrip() {
        let fc = stations_to_geojson(&[summary()]);
        let parsed = stations_from_geojson(&fc).unwrap();

        assert_eq!(parsed.len(), 1);
        let s = &parsed[0];
        assert_eq!(s.station_id, "1");
        assert_eq!(s.lat, 43.529806);
        assert_eq!(s.lon, -5.673428);
        assert_eq!(s.pm25_avg, Some(12.3)); // rounded on the way out
        assert_eq!(s.pm10_avg, None);
        assert_eq!(s.aqi_level, AqiLevel::Moderate);
        assert!(!s.is_stale);
        assert_eq!(s.latest_reading.as_deref(), Some("2024-05-10 09:00"));
    }

    #[test]
    fn test_station_properties_shape() {
        let fc = stations_to_geojson(&[summary()]);
        let props = fc.features[0].properties.as_ref().unwrap();

        assert_eq!(props["aqi_level"], json!("Moderate"));
        assert_eq!(props["color"], json!("#eab308"));
        assert_eq!(props["pm10_avg"], serde_json::Value::Null);
        assert_eq!(props["aqi_score"], json!(62.2));
    }

    #[test]
    fn test_inactive_level_marks_stale_on_read() {
        let mut s = summary();
        s.aqi_level = AqiLevel::Inactive;
        s.aqi_score = None;

        let fc = stations_to_geojson(&[s]);
        let parsed = stations_from_geojson(&fc).unwrap();
        assert!(parsed[0].is_stale);
    }

    #[test]
    fn test_routes_from_geojson_line_id_fallback() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "line": "L1" },
                    "geometry": { "type": "LineString", "coordinates": [[-5.66, 43.53], [-5.65, 43.54]] }
                },
                {
                    "type": "Feature",
                    "properties": { "ref": "10" },
                    "geometry": { "type": "LineString", "coordinates": [[-5.66, 43.53], [-5.65, 43.54]] }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": { "type": "Point", "coordinates": [-5.66, 43.53] }
                }
            ]
        }"#;

        let fc: FeatureCollection = raw.parse::<GeoJson>().unwrap().try_into().unwrap();
        let routes = routes_from_geojson(&fc);

        assert_eq!(routes.len(), 2); // the point is skipped
        assert_eq!(routes[0].line_id, "L1");
        assert_eq!(routes[1].line_id, "10");
        assert_eq!(routes[0].geometry.coord_count(), 2);
    }

    #[test]
    fn test_styled_routes_properties() {
        let styled = crate::routes::style_routes(&routes_fixture());
        let fc = styled_routes_to_geojson(&styled);

        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["line"], json!("L1"));
        assert_eq!(props["offset_px"], json!(-15.0));
        assert!(props["color"].as_str().unwrap().starts_with('#'));
    }

    fn routes_fixture() -> Vec<RouteFeature> {
        vec![RouteFeature {
            line_id: "L1".to_string(),
            geometry: RouteGeometry::Line(LineString::from(vec![
                (-5.66, 43.53),
                (-5.65, 43.54),
            ])),
        }]
    }
}
