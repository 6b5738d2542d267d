//! Region planning: area-to-tile enumeration.
//!
//! Given a geographic bounding box and a set of zoom levels, [`plan`]
//! enumerates the exact set of tiles required to cover the region and
//! computes the total. The enumeration order is deterministic (ascending
//! zoom, then x, then y) and is used downstream as the batch-submission
//! order.

use crate::coord::{project, GeoBounds, TileCoord};

/// The full set of tiles covering a region across all configured zoom levels.
#[derive(Debug, Clone)]
pub struct RegionPlan {
    /// Tiles in submission order: ascending zoom, then x, then y.
    pub tiles: Vec<TileCoord>,
    /// Total tile count, equal to `tiles.len()`.
    pub total: usize,
}

/// Per-zoom-level tile rectangle derived from the region corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileRect {
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
}

impl TileRect {
    /// Projects the two opposite corners of `bounds` and normalizes the
    /// result into a min/max rectangle, so inverted corner ordering still
    /// yields a valid enumeration range.
    fn for_zoom(bounds: &GeoBounds, zoom: u8) -> Self {
        let (nw_lat, nw_lon) = bounds.northwest();
        let (se_lat, se_lon) = bounds.southeast();

        let nw = project(nw_lat, nw_lon, zoom);
        let se = project(se_lat, se_lon, zoom);

        Self {
            min_x: nw.x.min(se.x),
            max_x: nw.x.max(se.x),
            min_y: nw.y.min(se.y),
            max_y: nw.y.max(se.y),
        }
    }

    /// Number of tiles in the rectangle, inclusive on both axes.
    fn count(&self) -> usize {
        let width = (self.max_x - self.min_x + 1) as usize;
        let height = (self.max_y - self.min_y + 1) as usize;
        width * height
    }
}

/// Enumerates every tile needed to cover `bounds` at each of `zoom_levels`.
///
/// Each zoom level has an independent tile grid: the two opposite corners of
/// the bounds are projected to obtain a min/max tile-index rectangle, and
/// every integer (x, y) pair within that rectangle is included (inclusive).
pub fn plan(bounds: &GeoBounds, zoom_levels: &[u8]) -> RegionPlan {
    let mut tiles = Vec::new();

    for &zoom in zoom_levels {
        let rect = TileRect::for_zoom(bounds, zoom);
        tiles.reserve(rect.count());

        for x in rect.min_x..=rect.max_x {
            for y in rect.min_y..=rect.max_y {
                tiles.push(TileCoord { zoom, x, y });
            }
        }
    }

    let total = tiles.len();
    RegionPlan { tiles, total }
}
