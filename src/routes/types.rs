use geo_types::{LineString, MultiLineString};

/// A transit route as loaded from the open-data GeoJSON, before styling.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFeature {
    pub line_id: String,
    pub geometry: RouteGeometry,
}

/// Route geometry in (lon, lat) degree coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteGeometry {
    Line(LineString<f64>),
    MultiLine(MultiLineString<f64>),
}

impl RouteGeometry {
    /// Total number of coordinates across all constituent line strings.
    pub fn coord_count(&self) -> usize {
        match self {
            RouteGeometry::Line(line) => line.0.len(),
            RouteGeometry::MultiLine(multi) => multi.0.iter().map(|l| l.0.len()).sum(),
        }
    }
}

/// A route with its lateral offset applied and display color assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRoute {
    pub line_id: String,
    pub color: String,
    pub offset_pixels: f64,
    pub geometry: RouteGeometry,
}
