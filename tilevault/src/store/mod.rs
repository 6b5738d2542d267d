//! Filesystem-backed tile storage.
//!
//! [`TileStore`] resolves tile coordinates to deterministic cache paths
//! (`{root}/{source}/{z}/{x}/{y}.png`), performs idempotent fetch-or-skip
//! downloads through an [`AsyncHttpClient`], and provides the storage
//! accounting and cache-clear operations used by the UI layer.
//!
//! Failure here is non-fatal and local: a single bad tile is reported to
//! the caller, which counts it and moves on.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::coord::TileCoord;
use crate::provider::{AsyncHttpClient, ProviderError};
use crate::source::TileSource;

/// Errors that can occur while fetching or managing stored tiles.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP fetch primitive failed.
    #[error(transparent)]
    Http(#[from] ProviderError),

    /// Creating an intermediate cache directory failed.
    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the tile file failed.
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transport reported success but delivered no usable image data.
    #[error("Empty tile body for {tile}")]
    EmptyTile { tile: TileCoord },

    /// Removing cached files or directories failed.
    #[error("Failed to clear {path}: {source}")]
    ClearFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of a single idempotent tile fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The tile was already cached with nonzero size; no network access.
    AlreadyPresent,
    /// The tile was downloaded and stored; payload size in bytes.
    Stored(u64),
}

/// Filesystem-backed tile cache with fetch-or-skip semantics.
pub struct TileStore<C: AsyncHttpClient> {
    root: PathBuf,
    client: Arc<C>,
}

impl<C: AsyncHttpClient> TileStore<C> {
    /// Creates a store rooted at `root`.
    ///
    /// The root directory itself is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>, client: Arc<C>) -> Self {
        Self {
            root: root.into(),
            client,
        }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic on-disk path for a tile: `{root}/{source}/{z}/{x}/{y}.png`.
    pub fn tile_path(&self, tile: &TileCoord, source: TileSource) -> PathBuf {
        self.root
            .join(source.name())
            .join(tile.zoom.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.png", tile.y))
    }

    /// Checks local presence: the tile file exists with nonzero size.
    pub fn exists(&self, tile: &TileCoord, source: TileSource) -> bool {
        self.tile_path(tile, source)
            .metadata()
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }

    /// Downloads one tile unless it is already cached.
    ///
    /// Safe to call repeatedly: if the file already exists with nonzero
    /// size, returns [`FetchOutcome::AlreadyPresent`] without touching the
    /// network. Zero-byte downloads are failures even when the transport
    /// reported no error; the empty file is removed so a later run retries.
    pub async fn fetch_one(
        &self,
        tile: &TileCoord,
        source: TileSource,
    ) -> Result<FetchOutcome, StoreError> {
        let path = self.tile_path(tile, source);

        if self.exists(tile, source) {
            return Ok(FetchOutcome::AlreadyPresent);
        }

        if let Some(parent) = path.parent() {
            // create_dir_all is create-or-noop, so concurrent fetches into
            // the same column directory cannot race each other into an error.
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let url = source.url(tile);
        let body = self.client.get(&url).await?;

        if body.is_empty() {
            return Err(StoreError::EmptyTile { tile: *tile });
        }

        let len = body.len() as u64;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;

        // Paranoia matching the download contract: a zero-byte file on disk
        // is a failure, not a success.
        let written = path.metadata().map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(StoreError::EmptyTile { tile: *tile });
        }

        debug!(tile = %tile, bytes = len, "tile stored");
        Ok(FetchOutcome::Stored(len))
    }

    /// Total bytes of cached tiles for `source`.
    pub fn size_bytes(&self, source: TileSource) -> u64 {
        walk(&self.root.join(source.name())).0
    }

    /// Number of cached tile files for `source`.
    pub fn tile_count(&self, source: TileSource) -> u64 {
        walk(&self.root.join(source.name())).1
    }

    /// Removes every cached tile for `source`.
    ///
    /// Failure is surfaced to the caller, which decides the user-facing
    /// messaging. Clearing an already-empty cache is a no-op success.
    pub fn clear(&self, source: TileSource) -> Result<(), StoreError> {
        let dir = self.root.join(source.name());
        if !dir.exists() {
            return Ok(());
        }
        std::fs::remove_dir_all(&dir).map_err(|e| StoreError::ClearFailed {
            path: dir,
            source: e,
        })
    }
}

/// Recursive (bytes, files) accounting for a directory tree.
fn walk(dir: &Path) -> (u64, u64) {
    let mut bytes = 0u64;
    let mut files = 0u64;

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return (0, 0),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let (b, f) = walk(&path);
            bytes += b;
            files += f;
        } else if let Ok(meta) = entry.metadata() {
            bytes += meta.len();
            files += 1;
        }
    }

    (bytes, files)
}
