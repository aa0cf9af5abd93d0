//! Configuration loaded from environment variables

use std::path::PathBuf;

use tracing::warn;

use crate::movement::{Geofence, MovementError, ONE_HOUR_SECS};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory searched recursively for trace_full_*.json files
    pub trace_dir: PathBuf,

    /// Area of interest
    pub geofence: Geofence,

    /// Fraction of discovered files to process, in (0, 1]
    pub sample_fraction: f64,

    /// Number of detection worker threads
    pub worker_threads: usize,

    /// Busiest window length in seconds
    pub window_secs: i64,

    /// Where to write the JSON report, if anywhere
    pub report_path: Option<PathBuf>,

    /// Where to write the geofence-filtered traces, if anywhere
    pub filtered_traces_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, MovementError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// Unparseable numbers fall back to their defaults with a warning. An
    /// unparseable `GEOFENCE` is an error since any fallback would analyse
    /// the wrong area.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MovementError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let geofence = match lookup("GEOFENCE") {
            Some(s) => s.parse()?,
            None => Geofence::schiphol(),
        };

        let sample_fraction = parse_or(&lookup, "SAMPLE_FRACTION", 1.0_f64);
        let sample_fraction = if sample_fraction > 0.0 && sample_fraction <= 1.0 {
            sample_fraction
        } else {
            warn!("SAMPLE_FRACTION {} outside (0, 1], using 1.0", sample_fraction);
            1.0
        };

        let default_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let worker_threads = parse_or(&lookup, "WORKER_THREADS", default_workers).max(1);

        let window_secs = parse_or(&lookup, "WINDOW_SECS", ONE_HOUR_SECS);
        if window_secs <= 0 {
            return Err(MovementError::InvalidWindow(window_secs));
        }

        Ok(Self {
            trace_dir: lookup("TRACE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("Data/traces")),
            geofence,
            sample_fraction,
            worker_threads,
            window_secs,
            report_path: lookup("REPORT_PATH").filter(|s| !s.is_empty()).map(PathBuf::from),
            filtered_traces_path: lookup("FILTERED_TRACES_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
