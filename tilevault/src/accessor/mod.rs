//! Read-side tile resolution for the map-rendering layer.
//!
//! [`CacheAccessor`] is independent of the download engine: at render time
//! it resolves a tile coordinate to either the local cached file or the
//! remote URL, based on a connectivity hint and cache presence.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::coord::TileCoord;
use crate::source::TileSource;

/// Resolved location of a tile for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileUri {
    /// Remote tile server URL.
    Remote(String),
    /// Locally cached tile file.
    Local(PathBuf),
}

impl fmt::Display for TileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileUri::Remote(url) => f.write_str(url),
            TileUri::Local(path) => write!(f, "file://{}", path.display()),
        }
    }
}

/// Read-only resolver over the same cache layout the store writes.
#[derive(Debug, Clone)]
pub struct CacheAccessor {
    root: PathBuf,
}

impl CacheAccessor {
    /// Creates an accessor over the cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a tile to a renderable URI.
    ///
    /// When `online` is true the remote URL is always returned, preferring
    /// fresh data over the cache. Offline, the local file is returned when
    /// present; otherwise the remote URL is returned anyway as a fail-open
    /// last resort (it will simply fail to load, which is acceptable
    /// degradation rather than a hard error).
    pub fn resolve(&self, tile: &TileCoord, source: TileSource, online: bool) -> TileUri {
        if online {
            return TileUri::Remote(source.url(tile));
        }

        let path = self.local_path(tile, source);
        let cached = path.metadata().map(|m| m.len() > 0).unwrap_or(false);
        if cached {
            TileUri::Local(path)
        } else {
            TileUri::Remote(source.url(tile))
        }
    }

    fn local_path(&self, tile: &TileCoord, source: TileSource) -> PathBuf {
        self.root
            .join(source.name())
            .join(tile.zoom.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.png", tile.y))
    }

    /// Cache root this accessor reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
