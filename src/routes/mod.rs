//! Visual disambiguation of overlapping bus routes.
//!
//! Several lines usually share the same street, so each route gets a small
//! lateral offset plus a stable color derived from its line id before it is
//! handed to the rendering boundary.

pub mod color;
pub mod offset;
mod types;

pub use types::{RouteFeature, RouteGeometry, StyledRoute};

use offset::{assign_offset_slot, offset_route_geometry};

/// Assigns each feature an offset slot (by position in the input list) and a
/// palette color (by line id), producing render-ready copies. Inputs are
/// never mutated.
pub fn style_routes(features: &[RouteFeature]) -> Vec<StyledRoute> {
    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let offset_pixels = assign_offset_slot(index);
            StyledRoute {
                line_id: feature.line_id.clone(),
                color: color::color_for(&feature.line_id).to_string(),
                offset_pixels,
                geometry: offset_route_geometry(&feature.geometry, offset_pixels),
            }
        })
        .collect()
}
