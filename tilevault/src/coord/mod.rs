//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates used by slippy-map tile servers.

mod types;

pub use types::{GeoBounds, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// Uses the standard Web Mercator slippy-map projection. The function is
/// pure and deterministic: the same inputs always produce the same tile.
///
/// Valid for latitudes in −85.05112878..85.05112878; inputs outside that
/// range produce undefined tile indices. No clamping is performed.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees
/// * `lon` - Longitude in degrees
/// * `zoom` - Zoom level (0 to 18)
#[inline]
pub fn project(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    // Number of tiles along one axis at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    // Convert longitude to tile X coordinate
    let x = ((lon + 180.0) / 360.0 * n) as u32;

    // Convert latitude to tile Y coordinate using Web Mercator projection
    let lat_rad = lat * PI / 180.0;
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32;

    TileCoord { zoom, x, y }
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    // Convert tile X coordinate to longitude
    let lon = tile.x as f64 / n * 360.0 - 180.0;

    // Convert tile Y coordinate to latitude using inverse Web Mercator
    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = project(40.7128, -74.0060, 16);
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_project_is_deterministic() {
        let a = project(51.5074, -0.1278, 14);
        let b = project(51.5074, -0.1278, 14);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tile_to_lat_lon_northwest_corner() {
        let tile = TileCoord::new(16, 19295, 24640);

        let (lat, lon) = tile_to_lat_lon(&tile);

        // Should be close to NYC but not exact (northwest corner of tile)
        assert!(
            (lat - 40.713).abs() < 0.01,
            "Latitude should be close to 40.713"
        );
        assert!(
            (lon - (-74.007)).abs() < 0.01,
            "Longitude should be close to -74.007"
        );
    }

    #[test]
    fn test_tile_to_lat_lon_at_equator() {
        // Tile at equator, prime meridian
        let tile = TileCoord::new(10, 512, 512);

        let (lat, lon) = tile_to_lat_lon(&tile);

        assert!(lat.abs() < 1.0, "Should be near equator");
        assert!(lon.abs() < 1.0, "Should be near prime meridian");
    }

    #[test]
    fn test_roundtrip_at_different_zooms() {
        let lat = 51.5074; // London
        let lon = -0.1278;

        for zoom in [0, 5, 10, 15, 18] {
            let tile = project(lat, lon, zoom);
            let (converted_lat, converted_lon) = tile_to_lat_lon(&tile);

            // tile_to_lat_lon returns the northwest corner, so tolerance is
            // one full tile at this zoom level
            let tile_size_degrees = 360.0 / (2.0_f64.powi(zoom as i32));

            assert!(
                (converted_lat - lat).abs() < tile_size_degrees,
                "Zoom {}: lat diff {} exceeds tile size {}",
                zoom,
                (converted_lat - lat).abs(),
                tile_size_degrees
            );
            assert!(
                (converted_lon - lon).abs() < tile_size_degrees,
                "Zoom {}: lon diff {} exceeds tile size {}",
                zoom,
                (converted_lon - lon).abs(),
                tile_size_degrees
            );
        }
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_roundtrip_property(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = project(lat, lon, zoom);
                let (converted_lat, converted_lon) = tile_to_lat_lon(&tile);

                let tile_size = 360.0 / (2.0_f64.powi(zoom as i32));

                prop_assert!(
                    (converted_lat - lat).abs() < tile_size,
                    "Latitude roundtrip failed: {} -> {} (diff: {}, tile_size: {})",
                    lat, converted_lat, (converted_lat - lat).abs(), tile_size
                );
                prop_assert!(
                    (converted_lon - lon).abs() < tile_size,
                    "Longitude roundtrip failed: {} -> {} (diff: {}, tile_size: {})",
                    lon, converted_lon, (converted_lon - lon).abs(), tile_size
                );
            }

            #[test]
            fn test_tile_coords_in_bounds(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = project(lat, lon, zoom);

                let max_tile = 2u32.pow(zoom as u32);
                prop_assert!(
                    tile.y < max_tile,
                    "Y {} exceeds maximum {} at zoom {}",
                    tile.y, max_tile, zoom
                );
                prop_assert!(
                    tile.x < max_tile,
                    "X {} exceeds maximum {} at zoom {}",
                    tile.x, max_tile, zoom
                );
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                // For fixed latitude, increasing longitude should increase X
                let tile1 = project(lat, lon1, zoom);
                let tile2 = project(lat, lon2, zoom);

                prop_assert!(
                    tile1.x < tile2.x,
                    "Longitude not monotonic: lon {} (x {}) >= lon {} (x {})",
                    lon1, tile1.x, lon2, tile2.x
                );
            }

            #[test]
            fn test_latitude_monotonic(
                lon in 0.0..1.0_f64,
                lat1 in 10.0..40.0_f64,
                lat2 in 45.0..80.0_f64,
                zoom in 10u8..=15
            ) {
                // For fixed longitude, increasing latitude should decrease Y
                // (Y axis is 0 at north)
                let tile1 = project(lat1, lon, zoom);
                let tile2 = project(lat2, lon, zoom);

                prop_assert!(
                    tile2.y < tile1.y,
                    "Latitude not monotonic: lat {} (y {}) <= lat {} (y {})",
                    lat1, tile1.y, lat2, tile2.y
                );
            }

            #[test]
            fn test_tile_to_lat_lon_in_bounds(
                x_raw in 0u32..65536,
                y_raw in 0u32..65536,
                zoom in 0u8..=16
            ) {
                let max_coord = 2u32.pow(zoom as u32);
                let x = x_raw % max_coord;
                let y = y_raw % max_coord;

                let tile = TileCoord { zoom, x, y };
                let (lat, lon) = tile_to_lat_lon(&tile);

                prop_assert!(
                    lat >= MIN_LAT && lat <= MAX_LAT,
                    "Latitude {} out of bounds [{}, {}]",
                    lat, MIN_LAT, MAX_LAT
                );
                prop_assert!(
                    lon >= -180.0 && lon <= 180.0,
                    "Longitude {} out of bounds [-180, 180]",
                    lon
                );
            }
        }
    }
}
