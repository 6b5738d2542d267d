//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported zoom level range
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;

/// Tile coordinates in the Web Mercator / Slippy Map system.
///
/// Uniquely addresses one raster tile within a zoom level's grid.
/// Coordinates are derived deterministically from geographic coordinates
/// and are never stored redundantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level (0-18)
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileCoord {
    /// Creates a tile coordinate.
    #[inline]
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic bounding box defining the download region.
///
/// Fixed and immutable per deployment. Embedded in persisted cache
/// metadata, so it carries serde derives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Creates a bounding box from its four edges.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Northwest corner as (lat, lon).
    #[inline]
    pub fn northwest(&self) -> (f64, f64) {
        (self.max_lat, self.min_lon)
    }

    /// Southeast corner as (lat, lon).
    #[inline]
    pub fn southeast(&self) -> (f64, f64) {
        (self.min_lat, self.max_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_display() {
        let tile = TileCoord::new(12, 2048, 1536);
        assert_eq!(format!("{}", tile), "12/2048/1536");
    }

    #[test]
    fn test_bounds_corners() {
        let bounds = GeoBounds::new(47.0, 48.0, 11.0, 12.0);
        assert_eq!(bounds.northwest(), (48.0, 11.0));
        assert_eq!(bounds.southeast(), (47.0, 12.0));
    }

    #[test]
    fn test_bounds_serde_roundtrip() {
        let bounds = GeoBounds::new(47.25, 47.75, 11.5, 12.25);
        let json = serde_json::to_string(&bounds).unwrap();
        let back: GeoBounds = serde_json::from_str(&json).unwrap();
        assert_eq!(bounds, back);
    }
}
