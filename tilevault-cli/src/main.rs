//! TileVault CLI - offline tile cache management.
//!
//! Downloads a configured region into the local cache, reports cache
//! status, clears the cache, and resolves individual tiles the way the
//! map renderer would.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use tilevault::accessor::CacheAccessor;
use tilevault::config::DownloadConfig;
use tilevault::coord::{GeoBounds, TileCoord};
use tilevault::engine::{BatchDownloadEngine, ProgressCallback};
use tilevault::ledger::CacheMetadataLedger;
use tilevault::logging::{default_log_dir, default_log_file, init_logging};
use tilevault::provider::ReqwestClient;
use tilevault::region;
use tilevault::source::TileSource;
use tilevault::store::TileStore;

/// Offline map-tile cache manager.
#[derive(Parser)]
#[command(name = "tilevault", version = tilevault::VERSION)]
struct Cli {
    /// Cache root directory.
    #[arg(long, default_value = "cache", global = true)]
    cache_root: PathBuf,

    /// Tile source (osm, osmde).
    #[arg(long, default_value = "osm", global = true)]
    source: TileSource,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download all tiles covering a region. Ctrl-C cancels cooperatively.
    Download {
        #[arg(long, allow_hyphen_values = true)]
        min_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        max_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        min_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        max_lon: f64,
        /// Zoom levels to cover, e.g. --zoom 10 --zoom 11 --zoom 12.
        #[arg(long = "zoom", required = true)]
        zoom_levels: Vec<u8>,
        /// Tiles per concurrent batch.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Delay between batches in milliseconds.
        #[arg(long)]
        inter_batch_delay_ms: Option<u64>,
    },
    /// Show cache metadata and storage accounting.
    Status,
    /// Remove all cached tiles and the metadata record for the source.
    Clear,
    /// Resolve a tile the way the map renderer would.
    Resolve {
        #[arg(long)]
        zoom: u8,
        #[arg(long)]
        x: u32,
        #[arg(long)]
        y: u32,
        /// Pretend the device is online.
        #[arg(long)]
        online: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: could not initialize logging: {}", e);
            None
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            eprintln!("{} {}", style("error:").red().bold(), message);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Download {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            zoom_levels,
            batch_size,
            inter_batch_delay_ms,
        } => {
            let bounds = GeoBounds::new(min_lat, max_lat, min_lon, max_lon);
            let mut config = DownloadConfig::new();
            if let Some(batch) = batch_size {
                config = config.with_batch_size(batch);
            }
            if let Some(delay) = inter_batch_delay_ms {
                config = config.with_inter_batch_delay(Duration::from_millis(delay));
            }
            download(cli.cache_root, cli.source, bounds, zoom_levels, config).await
        }
        Command::Status => status(cli.cache_root, cli.source),
        Command::Clear => clear(cli.cache_root, cli.source),
        Command::Resolve { zoom, x, y, online } => {
            let accessor = CacheAccessor::new(cli.cache_root);
            let uri = accessor.resolve(&TileCoord::new(zoom, x, y), cli.source, online);
            println!("{}", uri);
            Ok(())
        }
    }
}

async fn download(
    cache_root: PathBuf,
    source: TileSource,
    bounds: GeoBounds,
    zoom_levels: Vec<u8>,
    config: DownloadConfig,
) -> Result<(), String> {
    let client =
        Arc::new(ReqwestClient::new().map_err(|e| format!("HTTP client setup failed: {}", e))?);
    let store = Arc::new(TileStore::new(&cache_root, client));
    let ledger = CacheMetadataLedger::new(&cache_root);
    let engine = BatchDownloadEngine::new(store, ledger, source, config);

    let planned = region::plan(&bounds, &zoom_levels).total;
    println!(
        "Downloading {} tiles from {} into {}",
        planned,
        source,
        cache_root.display()
    );

    let control = engine.control();
    ctrlc::set_handler(move || {
        eprintln!("\ncancelling after the current batch...");
        control.cancel();
    })
    .map_err(|e| format!("failed to install Ctrl-C handler: {}", e))?;

    let bar = ProgressBar::new(planned as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} tiles ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let progress_bar = bar.clone();
    let on_progress: ProgressCallback = Arc::new(move |p| {
        progress_bar.set_position(p.current as u64);
        if p.fail_count > 0 {
            progress_bar.set_message(format!("{} failed", p.fail_count));
        }
        if let Some(ref e) = p.error {
            warn!(error = %e, "download aborted");
        }
    });

    let summary = engine.run(bounds, zoom_levels, on_progress).await;
    bar.finish_and_clear();

    println!(
        "{} {}/{} tiles ({} failed)",
        if summary.cancelled {
            style("cancelled:").yellow().bold()
        } else {
            style("done:").green().bold()
        },
        summary.total_succeeded,
        summary.total_requested,
        summary.total_failed,
    );

    match summary.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn status(cache_root: PathBuf, source: TileSource) -> Result<(), String> {
    let ledger = CacheMetadataLedger::new(&cache_root);
    let store = TileStore::new(
        &cache_root,
        Arc::new(ReqwestClient::new().map_err(|e| e.to_string())?),
    );

    match ledger.load().map_err(|e| e.to_string())? {
        Some(meta) => {
            println!("downloaded at:  {}", meta.downloaded_at.to_rfc3339());
            println!("complete:       {}", meta.download_complete);
            println!("recorded tiles: {}", meta.total_tiles);
            println!("zoom levels:    {:?}", meta.zoom_levels);
            println!(
                "bounds:         lat {}..{}, lon {}..{}",
                meta.bounds.min_lat, meta.bounds.max_lat, meta.bounds.min_lon, meta.bounds.max_lon
            );
        }
        None => println!("no download recorded"),
    }

    println!("files on disk:  {}", store.tile_count(source));
    println!(
        "cache size:     {:.1} MiB",
        store.size_bytes(source) as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}

fn clear(cache_root: PathBuf, source: TileSource) -> Result<(), String> {
    let store = TileStore::new(
        &cache_root,
        Arc::new(ReqwestClient::new().map_err(|e| e.to_string())?),
    );
    let ledger = CacheMetadataLedger::new(&cache_root);

    store
        .clear(source)
        .map_err(|e| format!("cache clear failed: {}", e))?;
    ledger
        .clear()
        .map_err(|e| format!("metadata clear failed: {}", e))?;

    println!("cache cleared for {}", source);
    Ok(())
}
