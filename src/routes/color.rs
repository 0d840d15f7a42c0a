//! Deterministic line-id-to-color mapping.
//!
//! Colors must be stable across page reloads without any stored state, so
//! the line id string is hashed with the classic multiply-by-31 rolling hash
//! and the result indexes a fixed palette. The hash replicates 32-bit signed
//! wraparound explicitly, so long ids land on the same palette slot the
//! original map showed.

/// Fixed palette; entries chosen to stay distinguishable on the base tiles.
pub const PALETTE: [&str; 12] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4",
    "#46f0f0", "#f032e6", "#bcf60c", "#fabebe", "#008080", "#e6beff",
];

/// Neutral gray for routes with no line id.
pub const FALLBACK_COLOR: &str = "#999999";

/// Maps a line id to its palette color.
///
/// Pure and total: the empty id fails closed to [`FALLBACK_COLOR`], every
/// other id hashes over its UTF-16 code units with
/// `hash = code + ((hash << 5) - hash)` in wrapping `i32` arithmetic and
/// indexes the palette with `|hash| mod 12`.
pub fn color_for(line_id: &str) -> &'static str {
    if line_id.is_empty() {
        return FALLBACK_COLOR;
    }

    let mut hash: i32 = 0;
    for unit in line_id.encode_utf16() {
        hash = (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }

    PALETTE[hash.unsigned_abs() as usize % PALETTE.len()]
}
