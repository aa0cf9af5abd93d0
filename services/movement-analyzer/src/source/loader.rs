//! Trace file discovery and async loading

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::readsb::{parse_trace_bytes, SourceError};
use crate::movement::RawTrace;

const TRACE_FILE_PREFIX: &str = "trace_full_";

/// One file's worth of loader output
#[derive(Debug)]
pub struct LoadedTrace {
    pub path: PathBuf,
    pub result: Result<RawTrace, SourceError>,
}

fn is_trace_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            name.starts_with(TRACE_FILE_PREFIX)
                && (name.ends_with(".json") || name.ends_with(".json.gz"))
        })
        .unwrap_or(false)
}

/// Result of scanning the trace directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Trace files, sorted by path
    pub files: Vec<PathBuf>,
    /// Entries below the root that could not be read
    pub unreadable: usize,
}

/// Recursively find `trace_full_*.json` files under `root`.
///
/// Only a missing or unreadable root is an error. Unreadable entries further
/// down are logged, counted and skipped.
pub fn discover_trace_files(root: &Path) -> std::io::Result<Discovery> {
    std::fs::read_dir(root)?;

    let root_str = root.to_str().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("trace directory {:?} is not valid UTF-8", root),
        )
    })?;
    let pattern = format!(
        "{}/**/{}*.json*",
        glob::Pattern::escape(root_str),
        TRACE_FILE_PREFIX
    );
    let paths = glob::glob(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut discovery = Discovery::default();
    for entry in paths {
        match entry {
            Ok(path) if is_trace_file(&path) => discovery.files.push(path),
            Ok(_) => {}
            Err(e) => {
                discovery.unreadable += 1;
                warn!("Skipping unreadable path {:?}: {}", e.path(), e.error());
            }
        }
    }

    discovery.files.sort();
    debug!(
        "Discovered {} trace files under {:?} ({} unreadable)",
        discovery.files.len(),
        root,
        discovery.unreadable
    );
    Ok(discovery)
}

/// Pick a random subset holding `fraction` of the files (rounded down).
///
/// A fraction of 1.0 or more keeps every file in its original order.
pub fn select_fraction<R: Rng + ?Sized>(
    files: Vec<PathBuf>,
    fraction: f64,
    rng: &mut R,
) -> Vec<PathBuf> {
    if fraction >= 1.0 {
        return files;
    }

    let count = (files.len() as f64 * fraction.max(0.0)) as usize;
    let mut selected: Vec<PathBuf> = files.choose_multiple(rng, count).cloned().collect();
    selected.sort();
    selected
}

/// Read and decode each file, sending one [`LoadedTrace`] per file.
///
/// Failures are reported per file through the channel; the loader only
/// stops early when the receiving side goes away.
pub async fn load_trace_files(paths: Vec<PathBuf>, tx: mpsc::Sender<LoadedTrace>) {
    let total = paths.len();
    info!("Loading {} trace files...", total);

    for path in paths {
        let result = match tokio::fs::read(&path).await {
            Ok(bytes) => parse_trace_bytes(&bytes),
            Err(e) => Err(SourceError::Io(e)),
        };

        if tx.send(LoadedTrace { path, result }).await.is_err() {
            warn!("Trace channel closed, stopping loader");
            return;
        }
    }

    debug!("Loader finished after {} files", total);
}
