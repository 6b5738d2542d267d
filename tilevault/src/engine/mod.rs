//! Batched concurrent tile download engine.
//!
//! [`BatchDownloadEngine`] drives a [`RegionPlan`](crate::region::RegionPlan)
//! through the [`TileStore`] in fixed-size concurrent batches, honoring
//! cooperative pause and cancel signals and emitting progress after every
//! batch.
//!
//! # Session model
//!
//! One logical download session runs at a time per engine (and the engine
//! owns its cache root, so per cache root). A second `run` call while a
//! session is in flight joins the existing session and receives the same
//! [`DownloadSummary`]; it does not start a duplicate download and its
//! progress callback is not invoked.
//!
//! Pause and cancel are delivered through a [`SessionControl`] handle backed
//! by a watch channel. While paused the engine awaits a state change, so the
//! task truly suspends instead of sleep-polling. Both signals take effect at
//! batch boundaries only: tiles already in flight are allowed to land.

mod control;

pub use control::SessionControl;
use control::SessionState;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::DownloadConfig;
use crate::coord::GeoBounds;
use crate::ledger::{CacheMetadata, CacheMetadataLedger};
use crate::provider::AsyncHttpClient;
use crate::region;
use crate::source::TileSource;
use crate::store::TileStore;

/// Progress snapshot emitted after every completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Tiles attempted so far.
    pub current: usize,
    /// Total tiles planned for the region.
    pub total: usize,
    /// Integer percentage 0..=100.
    pub percentage: u8,
    /// Tiles stored or already present.
    pub success_count: usize,
    /// Tiles that failed to download.
    pub fail_count: usize,
    /// Set once when a batch-fatal error aborts the region.
    pub error: Option<String>,
}

/// Callback invoked with a [`Progress`] snapshot after each batch.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Final result of a download session.
///
/// Cloneable so that callers joining an in-flight session receive the same
/// summary as the originating caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Tiles the region plan requested.
    pub total_requested: usize,
    /// Tiles stored or already present at the end of the run.
    pub total_succeeded: usize,
    /// Tiles that failed; they remain absent and are retried only by a
    /// subsequent full invocation.
    pub total_failed: usize,
    /// True when the session stopped early due to cancellation.
    pub cancelled: bool,
    /// Batch-fatal error, if one aborted the region.
    pub error: Option<String>,
}

type SharedSummary = Shared<BoxFuture<'static, DownloadSummary>>;

/// Outcome of the batch-boundary gate.
enum Gate {
    Proceed,
    Cancelled,
}

/// Orchestrates region downloads over a [`TileStore`].
pub struct BatchDownloadEngine<C: AsyncHttpClient + 'static> {
    store: Arc<TileStore<C>>,
    ledger: CacheMetadataLedger,
    source: TileSource,
    config: DownloadConfig,
    control: SessionControl,
    state_rx: watch::Receiver<SessionState>,
    inflight: Arc<Mutex<Option<SharedSummary>>>,
}

impl<C: AsyncHttpClient + 'static> BatchDownloadEngine<C> {
    /// Creates an engine over `store`.
    ///
    /// The engine assumes exclusive ownership of downloads into the store's
    /// cache root; create one engine per cache root.
    pub fn new(
        store: Arc<TileStore<C>>,
        ledger: CacheMetadataLedger,
        source: TileSource,
        config: DownloadConfig,
    ) -> Self {
        let (control, state_rx) = SessionControl::channel();
        Self {
            store,
            ledger,
            source,
            config,
            control,
            state_rx,
            inflight: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for pausing, resuming, and cancelling the active session.
    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    /// True while a download session is in flight.
    pub fn is_active(&self) -> bool {
        self.inflight.lock().is_some()
    }

    /// Downloads every tile covering `bounds` at `zoom_levels`.
    ///
    /// If a session is already in flight, joins it instead of starting a
    /// duplicate: the caller awaits the same summary and `on_progress` is
    /// ignored. Otherwise a fresh session is spawned; it keeps running to
    /// completion even if this future is dropped.
    pub async fn run(
        &self,
        bounds: GeoBounds,
        zoom_levels: Vec<u8>,
        on_progress: ProgressCallback,
    ) -> DownloadSummary {
        let shared = {
            let mut inflight = self.inflight.lock();
            match inflight.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let shared = self.spawn_session(bounds, zoom_levels, on_progress);
                    *inflight = Some(shared.clone());
                    shared
                }
            }
        };
        shared.await
    }

    fn spawn_session(
        &self,
        bounds: GeoBounds,
        zoom_levels: Vec<u8>,
        on_progress: ProgressCallback,
    ) -> SharedSummary {
        // A fresh session starts unpaused and uncancelled; control signals
        // apply to the active session only.
        self.control.reset();

        let session = Session {
            store: Arc::clone(&self.store),
            ledger: self.ledger.clone(),
            source: self.source,
            config: self.config,
            state_rx: self.state_rx.clone(),
            on_progress,
        };
        let inflight = Arc::clone(&self.inflight);

        let handle = tokio::spawn(async move {
            let summary = session.execute(bounds, zoom_levels).await;
            *inflight.lock() = None;
            summary
        });

        async move {
            match handle.await {
                Ok(summary) => summary,
                Err(e) => DownloadSummary {
                    total_requested: 0,
                    total_succeeded: 0,
                    total_failed: 0,
                    cancelled: false,
                    error: Some(format!("download session task failed: {}", e)),
                },
            }
        }
        .boxed()
        .shared()
    }
}

/// State owned exclusively by one active download invocation.
struct Session<C: AsyncHttpClient + 'static> {
    store: Arc<TileStore<C>>,
    ledger: CacheMetadataLedger,
    source: TileSource,
    config: DownloadConfig,
    state_rx: watch::Receiver<SessionState>,
    on_progress: ProgressCallback,
}

impl<C: AsyncHttpClient + 'static> Session<C> {
    async fn execute(mut self, bounds: GeoBounds, zoom_levels: Vec<u8>) -> DownloadSummary {
        let plan = region::plan(&bounds, &zoom_levels);
        let total = plan.total;

        // Short-circuit when the ledger already describes this exact region
        // as complete. A changed region or zoom set mismatches and falls
        // through to a fresh download.
        match self.ledger.load() {
            Ok(Some(meta)) if meta.is_current(&bounds, &zoom_levels, total as u64) => {
                info!(total, "offline cache already complete, skipping download");
                return DownloadSummary {
                    total_requested: total,
                    total_succeeded: total,
                    total_failed: 0,
                    cancelled: false,
                    error: None,
                };
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not read cache metadata, downloading"),
        }

        info!(
            total,
            zoom_levels = ?zoom_levels,
            source = %self.source,
            batch_size = self.config.batch_size(),
            "starting region download"
        );

        let started = Instant::now();
        let mut current = 0usize;
        let mut success = 0usize;
        let mut fail = 0usize;
        let mut cancelled = false;
        let mut fatal: Option<String> = None;

        let batch_count = plan.tiles.chunks(self.config.batch_size()).count();

        for (index, batch) in plan.tiles.chunks(self.config.batch_size()).enumerate() {
            if let Gate::Cancelled = self.gate().await {
                info!(current, total, "download cancelled");
                cancelled = true;
                break;
            }

            // Fan out the whole batch; every tile outcome is caught
            // independently so one failure cannot fail the batch.
            let mut handles = Vec::with_capacity(batch.len());
            for tile in batch {
                let store = Arc::clone(&self.store);
                let source = self.source;
                let tile = *tile;
                handles.push(tokio::spawn(
                    async move { store.fetch_one(&tile, source).await },
                ));
            }

            let mut outcomes = handles.into_iter().zip(batch);
            for (handle, tile) in outcomes.by_ref() {
                match handle.await {
                    Ok(Ok(_)) => success += 1,
                    Ok(Err(e)) => {
                        fail += 1;
                        warn!(tile = %tile, error = %e, "tile download failed");
                    }
                    Err(e) => {
                        // The concurrent-fetch primitive itself failed; this
                        // aborts the whole region and is not retried.
                        fatal = Some(format!("batch execution failed: {}", e));
                    }
                }
                current += 1;
                if fatal.is_some() {
                    break;
                }
            }
            // Tiles never awaited in an aborted batch do not count as
            // attempted; stop their tasks rather than detaching them.
            for (handle, _) in outcomes {
                handle.abort();
            }

            self.checkpoint(&bounds, &zoom_levels, success as u64, false);

            let percentage = if total == 0 {
                100
            } else {
                (current * 100 / total) as u8
            };
            (self.on_progress)(Progress {
                current,
                total,
                percentage,
                success_count: success,
                fail_count: fail,
                error: fatal.clone(),
            });

            let elapsed = started.elapsed().as_secs_f64();
            debug!(
                batch = index + 1,
                batch_count,
                current,
                speed_tiles_per_sec = current as f64 / elapsed.max(f64::EPSILON),
                "batch complete"
            );

            if fatal.is_some() {
                break;
            }
            if current < total {
                tokio::time::sleep(self.config.inter_batch_delay()).await;
            }
        }

        if !cancelled && fatal.is_none() {
            self.checkpoint(&bounds, &zoom_levels, success as u64, true);
            info!(
                total_succeeded = success,
                total_failed = fail,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "region download complete"
            );
        } else {
            // Partial totals stay durable, but the cache is not usable as a
            // complete region.
            self.checkpoint(&bounds, &zoom_levels, success as u64, false);
        }

        DownloadSummary {
            total_requested: total,
            total_succeeded: success,
            total_failed: fail,
            cancelled,
            error: fatal,
        }
    }

    /// Batch-boundary gate: returns once the session may proceed, or
    /// reports cancellation. While paused, awaits the next state change so
    /// the task suspends instead of polling.
    async fn gate(&mut self) -> Gate {
        loop {
            let state = *self.state_rx.borrow_and_update();
            match state {
                SessionState::Running => return Gate::Proceed,
                SessionState::Cancelled => return Gate::Cancelled,
                SessionState::Paused => {
                    debug!("download paused, waiting");
                    if self.state_rx.changed().await.is_err() {
                        // Control handle dropped; treat as cancellation.
                        return Gate::Cancelled;
                    }
                }
            }
        }
    }

    /// Best-effort metadata flush after each batch.
    ///
    /// Metadata is an incremental checkpoint, not a correctness gate for
    /// individual tiles, so a write failure is logged and swallowed.
    fn checkpoint(&self, bounds: &GeoBounds, zoom_levels: &[u8], total_tiles: u64, complete: bool) {
        let metadata = CacheMetadata {
            downloaded_at: Utc::now(),
            total_tiles,
            zoom_levels: zoom_levels.to_vec(),
            bounds: *bounds,
            download_complete: complete,
        };
        if let Err(e) = self.ledger.store(&metadata) {
            warn!(error = %e, "metadata checkpoint failed");
        }
    }
}
