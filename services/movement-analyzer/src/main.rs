//! Movement Analyzer - airport departures/arrivals from ADS-B traces
//!
//! Reads readsb trace files, keeps the samples inside an airport geofence,
//! detects ground/airborne transitions per aircraft and reports the busiest
//! rolling hour of movements.

mod config;
mod movement;
mod pipeline;
mod report;
mod source;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use pipeline::{DetectionPool, PipelineStats};
use report::AnalysisReport;
use source::LoadedTrace;

/// Progress is logged every this many files
const PROGRESS_INTERVAL: usize = 500;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movement_analyzer=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("===========================================");
    info!("   Movement Analyzer - ADS-B traces");
    info!("===========================================");

    let config = Config::from_env().context("Invalid configuration")?;

    info!("Configuration:");
    info!("  Trace directory: {:?}", config.trace_dir);
    info!(
        "  Geofence: NW {:?} / SE {:?}",
        config.geofence.north_west(),
        config.geofence.south_east()
    );
    info!("  Sample fraction: {}", config.sample_fraction);
    info!("  Worker threads: {}", config.worker_threads);
    info!("  Window: {} s", config.window_secs);

    let stats = Arc::new(PipelineStats::new());

    // Find trace files
    let trace_dir = config.trace_dir.clone();
    let discovery = tokio::task::spawn_blocking(move || source::discover_trace_files(&trace_dir))
        .await
        .context("Discovery task failed")?
        .with_context(|| format!("Failed to scan {:?}", config.trace_dir))?;
    if discovery.unreadable > 0 {
        warn!(
            "{} paths under {:?} could not be read",
            discovery.unreadable, config.trace_dir
        );
        stats.record_unreadable_paths(discovery.unreadable);
    }
    let discovered = discovery.files.len();
    let files = source::select_fraction(
        discovery.files,
        config.sample_fraction,
        &mut rand::thread_rng(),
    );
    info!("Processing {} of {} trace files", files.len(), discovered);

    // Loader task -> detection workers
    let total_files = files.len();
    let (trace_tx, trace_rx) = mpsc::channel::<LoadedTrace>(256);
    let loader_handle = tokio::spawn(source::load_trace_files(files, trace_tx));

    let pool = DetectionPool::start(config.worker_threads, config.geofence, stats.clone())?;
    let feeder_stats = stats.clone();
    let pooled = tokio::task::spawn_blocking(move || {
        feed_pool(trace_rx, &pool, &feeder_stats, total_files);
        pool.finish()
    })
    .await
    .context("Detection pipeline failed")?;

    loader_handle.await.context("Loader task failed")?;

    info!(
        "Filtered {} aircraft with samples inside the geofence",
        pooled.traces.len()
    );

    let report = AnalysisReport::build(
        config.geofence,
        stats.snapshot(),
        pooled.events,
        config.window_secs,
    )?;
    report.log();

    if let Some(path) = &config.filtered_traces_path {
        report::write_filtered_traces(&pooled.traces, path).await?;
    }

    if let Some(path) = &config.report_path {
        report.write_json(path).await?;
    }

    Ok(())
}

/// Forward loaded traces to the detection pool, counting per-file failures
fn feed_pool(
    mut trace_rx: mpsc::Receiver<LoadedTrace>,
    pool: &DetectionPool,
    stats: &PipelineStats,
    total_files: usize,
) {
    let mut seen = 0usize;

    while let Some(loaded) = trace_rx.blocking_recv() {
        seen += 1;

        match loaded.result {
            Ok(raw) => {
                stats.record_file_loaded();
                if !pool.submit(raw) {
                    warn!("Detection workers gone, stopping");
                    break;
                }
            }
            Err(e) => {
                stats.record_file_error();
                warn!("Error with file {:?}: {}", loaded.path, e);
            }
        }

        if seen % PROGRESS_INTERVAL == 0 {
            info!("Processed file {} of {}...", seen, total_files);
        }
    }
}
