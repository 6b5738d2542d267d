//! Tile source definitions.
//!
//! A [`TileSource`] names a raster tile server and knows how to substitute
//! a tile coordinate into its `{z}/{x}/{y}` URL template. The source name
//! doubles as the cache subdirectory, so tiles from different servers never
//! collide on disk.

use crate::coord::TileCoord;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Base URL for the standard OpenStreetMap tile server.
const OSM_BASE_URL: &str = "https://tile.openstreetmap.org";

/// Base URL for the German-style OpenStreetMap tile server.
const OSM_DE_BASE_URL: &str = "https://tile.openstreetmap.de";

/// Error returned when parsing an unknown source name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tile source: {0}")]
pub struct UnknownSource(pub String);

/// Enumerated raster tile sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileSource {
    /// Standard OpenStreetMap rendering.
    #[default]
    Osm,
    /// German community OpenStreetMap rendering.
    OsmDe,
}

impl TileSource {
    /// Stable name, used as the cache subdirectory for this source.
    pub fn name(&self) -> &'static str {
        match self {
            TileSource::Osm => "osm",
            TileSource::OsmDe => "osmde",
        }
    }

    /// Builds the remote tile URL for the given coordinate.
    pub fn url(&self, tile: &TileCoord) -> String {
        let base = match self {
            TileSource::Osm => OSM_BASE_URL,
            TileSource::OsmDe => OSM_DE_BASE_URL,
        };
        format!("{}/{}/{}/{}.png", base, tile.zoom, tile.x, tile.y)
    }
}

impl fmt::Display for TileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TileSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "osm" => Ok(TileSource::Osm),
            "osmde" => Ok(TileSource::OsmDe),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_substitution() {
        let tile = TileCoord::new(14, 8717, 5740);
        assert_eq!(
            TileSource::Osm.url(&tile),
            "https://tile.openstreetmap.org/14/8717/5740.png"
        );
        assert_eq!(
            TileSource::OsmDe.url(&tile),
            "https://tile.openstreetmap.de/14/8717/5740.png"
        );
    }

    #[test]
    fn test_name_roundtrips_through_from_str() {
        for source in [TileSource::Osm, TileSource::OsmDe] {
            let parsed: TileSource = source.name().parse().unwrap();
            assert_eq!(parsed, source);
        }
    }

    #[test]
    fn test_unknown_source_rejected() {
        let err = "bing".parse::<TileSource>().unwrap_err();
        assert_eq!(err, UnknownSource("bing".to_string()));
    }
}
