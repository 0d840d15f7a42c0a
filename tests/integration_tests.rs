use chrono::NaiveDate;
use geo_types::LineString;

use urban_layers::geojson_io;
use urban_layers::pollution::aqi::AqiLevel;
use urban_layers::pollution::normalize::normalize;
use urban_layers::pollution::payload::parse_readings;
use urban_layers::routes::{RouteFeature, RouteGeometry, style_routes};

#[test]
fn test_full_pollution_pipeline() {
    let payload: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/sample_readings.json"))
            .expect("fixture is valid JSON");
    let readings = parse_readings(&payload).expect("fixture parses");
    assert_eq!(readings.len(), 3);

    let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
    let stations = normalize(&readings, today);
    assert_eq!(stations.len(), 2);

    // Station 1: two fresh readings averaged and classified.
    let s1 = &stations[0];
    assert_eq!(s1.station_id, "1");
    assert_eq!(s1.name, "Estación Avenida Constitución");
    assert_eq!(s1.pm25_avg, Some(15.0));
    assert_eq!(s1.pm10_avg, Some(24.0));
    assert_eq!(s1.no2_avg, Some(32.0));
    assert_eq!(s1.o3_avg, None);
    // (15/25 + 24/50 + 32/40) * 100 / 3 = 62.666...
    assert!((s1.aqi_score.unwrap() - 188.0 / 3.0).abs() < 1e-9);
    assert_eq!(s1.aqi_level, AqiLevel::Moderate);
    assert!(!s1.is_stale);
    assert_eq!(s1.latest_reading.as_deref(), Some("2024-05-10 09:00"));

    // Station 2: latest reading is 75 days old, so it is inactive.
    let s2 = &stations[1];
    assert_eq!(s2.station_id, "2");
    assert!(s2.is_stale);
    assert_eq!(s2.aqi_level, AqiLevel::Inactive);
    assert_eq!(s2.aqi_score, None);
    assert_eq!(s2.pm10_avg, Some(60.0));

    // Round-trip through the snapshot shape preserves the summaries.
    let fc = geojson_io::stations_to_geojson(&stations);
    let restored = geojson_io::stations_from_geojson(&fc).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].aqi_level, AqiLevel::Moderate);
    assert!(restored[1].is_stale);
}

#[test]
fn test_overlapping_routes_become_parallel() {
    let shared = vec![(-5.6650, 43.5300), (-5.6600, 43.5300)];
    let features = vec![
        RouteFeature {
            line_id: "L1".to_string(),
            geometry: RouteGeometry::Line(LineString::from(shared.clone())),
        },
        RouteFeature {
            line_id: "L2".to_string(),
            geometry: RouteGeometry::Line(LineString::from(shared.clone())),
        },
    ];

    let styled = style_routes(&features);

    assert_eq!(styled[0].offset_pixels, -15.0);
    assert_eq!(styled[1].offset_pixels, -10.0);
    assert_ne!(styled[0].color, styled[1].color);

    // Both lines moved off the shared street, by different amounts, keeping
    // their point counts.
    let (a, b) = match (&styled[0].geometry, &styled[1].geometry) {
        (RouteGeometry::Line(a), RouteGeometry::Line(b)) => (a, b),
        _ => panic!("geometry type changed"),
    };
    assert_eq!(a.0.len(), 2);
    assert_eq!(b.0.len(), 2);
    for i in 0..2 {
        assert_ne!(a.0[i], b.0[i]);
        assert_ne!(a.0[i].y, shared[i].1);
        assert_ne!(b.0[i].y, shared[i].1);
    }

    // The styled collection carries everything the renderer needs.
    let fc = geojson_io::styled_routes_to_geojson(&styled);
    assert_eq!(fc.features.len(), 2);
    let props = fc.features[1].properties.as_ref().unwrap();
    assert_eq!(props["line"], serde_json::json!("L2"));
    assert_eq!(props["offset_px"], serde_json::json!(-10.0));
}
