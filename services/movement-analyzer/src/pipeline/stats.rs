//! Run-wide counters shared between the loader and detection workers

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for one analysis run
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub files_loaded: AtomicU64,
    pub file_errors: AtomicU64,
    pub traces_rejected: AtomicU64,
    pub samples_dropped: AtomicU64,
    pub aircraft_in_area: AtomicU64,
    pub events_detected: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file_loaded(&self) {
        self.files_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_error(&self) {
        self.file_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Paths that could not even be listed during discovery
    pub fn record_unreadable_paths(&self, count: usize) {
        self.file_errors.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_trace_rejected(&self) {
        self.traces_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_samples_dropped(&self, count: usize) {
        self.samples_dropped.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_aircraft(&self, events: usize) {
        self.aircraft_in_area.fetch_add(1, Ordering::Relaxed);
        self.events_detected.fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_loaded: self.files_loaded.load(Ordering::Relaxed),
            file_errors: self.file_errors.load(Ordering::Relaxed),
            traces_rejected: self.traces_rejected.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            aircraft_in_area: self.aircraft_in_area.load(Ordering::Relaxed),
            events_detected: self.events_detected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    pub files_loaded: u64,
    pub file_errors: u64,
    pub traces_rejected: u64,
    pub samples_dropped: u64,
    pub aircraft_in_area: u64,
    pub events_detected: u64,
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Files: {} loaded, {} failed | Traces: {} rejected, {} samples dropped | {} aircraft in area, {} events",
            self.files_loaded,
            self.file_errors,
            self.traces_rejected,
            self.samples_dropped,
            self.aircraft_in_area,
            self.events_detected
        )
    }
}
