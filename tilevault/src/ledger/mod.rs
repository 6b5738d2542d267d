//! Durable cache metadata record.
//!
//! [`CacheMetadataLedger`] persists one JSON record describing what has been
//! downloaded so far. It is the single source of truth for "is the offline
//! cache usable": the UI reads it for status, and a new download request
//! reads it to short-circuit when the region is already complete.
//!
//! The record is overwritten atomically (temp file + rename) after each
//! batch, so a crash mid-download leaves the previous consistent record
//! rather than a torn file. Metadata may under-report by up to one batch
//! after a crash; this is an accepted tradeoff.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::GeoBounds;

/// Fixed filename of the metadata record under the cache root.
const LEDGER_FILE: &str = "cache_metadata.json";

/// Errors from reading or writing the metadata record.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed metadata record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Durable record of a region download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the record was last written (ISO-8601 in the JSON encoding).
    pub downloaded_at: DateTime<Utc>,
    /// Count of successfully stored tiles for the described region.
    pub total_tiles: u64,
    /// Zoom levels the download covered.
    pub zoom_levels: Vec<u8>,
    /// Region the download covered.
    pub bounds: GeoBounds,
    /// True only after a run finished without cancellation or fatal error.
    pub download_complete: bool,
}

impl CacheMetadata {
    /// Short-circuit predicate for a new download request: the stored
    /// record describes the currently configured region, is marked
    /// complete, and its tile count matches the freshly planned total.
    ///
    /// If the configured region or zoom set changes, the stored values
    /// mismatch and a re-download is triggered.
    pub fn is_current(&self, bounds: &GeoBounds, zoom_levels: &[u8], planned_total: u64) -> bool {
        self.download_complete
            && self.total_tiles == planned_total
            && self.bounds == *bounds
            && self.zoom_levels == zoom_levels
    }
}

/// Thin durable key-value record keyed by a fixed filename.
#[derive(Debug, Clone)]
pub struct CacheMetadataLedger {
    path: PathBuf,
}

impl CacheMetadataLedger {
    /// Creates a ledger stored under `cache_root`.
    pub fn new(cache_root: impl AsRef<Path>) -> Self {
        Self {
            path: cache_root.as_ref().join(LEDGER_FILE),
        }
    }

    /// Path of the backing record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current record, if one exists.
    pub fn load(&self) -> Result<Option<CacheMetadata>, LedgerError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Overwrites the record atomically.
    ///
    /// Writes to a sibling temp file and renames it into place, so readers
    /// never observe a partially written record.
    pub fn store(&self, metadata: &CacheMetadata) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(metadata)?;
        let tmp = self.path.with_extension("json.tmp");

        std::fs::write(&tmp, json).map_err(|e| LedgerError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| LedgerError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Deletes the record. Missing record is a no-op success.
    pub fn clear(&self) -> Result<(), LedgerError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
