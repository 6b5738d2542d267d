//! TileVault - offline map-tile cache for field-data applications.
//!
//! Downloads, stores, and serves raster map tiles for a fixed geographic
//! region across a range of zoom levels, with pausable/resumable/cancelable
//! batch downloads, crash-safe incremental metadata, and an offline-aware
//! read path for the map renderer.
//!
//! # Overview
//!
//! - [`coord`] - geographic ↔ tile-index math (Web Mercator slippy map)
//! - [`region`] - area-to-tile enumeration and totals
//! - [`store`] - idempotent per-tile fetch-or-skip storage
//! - [`engine`] - batched concurrent downloads with pause/cancel/resume
//! - [`ledger`] - durable metadata record read by UI and resume logic
//! - [`accessor`] - render-time tile resolution with offline fallback
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilevault::config::DownloadConfig;
//! use tilevault::coord::GeoBounds;
//! use tilevault::engine::BatchDownloadEngine;
//! use tilevault::ledger::CacheMetadataLedger;
//! use tilevault::provider::ReqwestClient;
//! use tilevault::source::TileSource;
//! use tilevault::store::TileStore;
//!
//! let client = Arc::new(ReqwestClient::new()?);
//! let store = Arc::new(TileStore::new("cache", client));
//! let ledger = CacheMetadataLedger::new("cache");
//! let engine = BatchDownloadEngine::new(store, ledger, TileSource::Osm,
//!     DownloadConfig::default());
//!
//! let bounds = GeoBounds::new(48.06, 48.25, 11.36, 11.72);
//! let summary = engine
//!     .run(bounds, vec![10, 11, 12], Arc::new(|p| println!("{}%", p.percentage)))
//!     .await;
//! ```

pub mod accessor;
pub mod config;
pub mod coord;
pub mod engine;
pub mod ledger;
pub mod logging;
pub mod provider;
pub mod region;
pub mod source;
pub mod store;

/// Version of the TileVault library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
