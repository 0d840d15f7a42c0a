//! Perpendicular route offsetting.
//!
//! Each point of a polyline is displaced along the 90°-rotated unit
//! direction of its outgoing segment. A vertex uses only that one segment,
//! with no averaging against the previous one, so sharp turns show a visible
//! kink; that matches the existing map output and is kept as-is.

use geo_types::{Coord, LineString, MultiLineString};

use super::types::RouteGeometry;

/// Degrees of longitude/latitude per screen pixel of offset. A flat-earth
/// approximation tuned for the city's latitude; not valid globally.
pub const DEGREES_PER_PIXEL: f64 = 0.000_01;

/// Number of distinct offset slots cycled over the feature list.
pub const SLOT_PERIOD: usize = 7;

/// Pixel spacing between adjacent slots.
pub const SLOT_STEP_PIXELS: f64 = 5.0;

/// Maps a feature's position in the full load-order list to a signed pixel
/// offset in {-15, -10, -5, 0, 5, 10, 15}, cycling with period 7.
///
/// The slot depends only on the index, never on the line id or any spatial
/// clustering, so two overlapping routes loaded far apart in the input can
/// still share a slot; color is what disambiguates them then. The formula is
/// kept exactly for visual compatibility with the existing map.
pub fn assign_offset_slot(feature_index: usize) -> f64 {
    ((feature_index % SLOT_PERIOD) as f64 - 3.0) * SLOT_STEP_PIXELS
}

/// Returns a copy of `line` with every point displaced perpendicular to its
/// outgoing segment by `offset_pixels`.
///
/// Zero-length segments (duplicate consecutive points) pass their point
/// through unshifted, and a line with fewer than two points is returned
/// unchanged. Point count is always preserved. Never fails.
pub fn offset_line_string(line: &LineString<f64>, offset_pixels: f64) -> LineString<f64> {
    let coords = &line.0;
    if coords.len() < 2 {
        return line.clone();
    }

    let shift = offset_pixels * DEGREES_PER_PIXEL;
    let mut shifted = Vec::with_capacity(coords.len());

    for i in 0..coords.len() {
        // The last point reuses the final segment's direction.
        let (a, b) = if i + 1 < coords.len() {
            (coords[i], coords[i + 1])
        } else {
            (coords[i - 1], coords[i])
        };

        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();

        if len == 0.0 {
            shifted.push(coords[i]);
            continue;
        }

        let perp_x = -dy / len;
        let perp_y = dx / len;

        shifted.push(Coord {
            x: coords[i].x + perp_x * shift,
            y: coords[i].y + perp_y * shift,
        });
    }

    LineString::new(shifted)
}

/// Applies [`offset_line_string`] to each constituent of a route geometry
/// independently. Output has the same type and coordinate count as input.
pub fn offset_route_geometry(geometry: &RouteGeometry, offset_pixels: f64) -> RouteGeometry {
    match geometry {
        RouteGeometry::Line(line) => RouteGeometry::Line(offset_line_string(line, offset_pixels)),
        RouteGeometry::MultiLine(multi) => RouteGeometry::MultiLine(MultiLineString::new(
            multi
                .0
                .iter()
                .map(|line| offset_line_string(line, offset_pixels))
                .collect(),
        )),
    }
}
