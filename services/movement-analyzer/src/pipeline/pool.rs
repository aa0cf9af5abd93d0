//! Per-aircraft detection worker pool
//!
//! Raw traces go in through a bounded channel, each worker validates,
//! filters and detects one aircraft at a time and sends its private result
//! back. Results are concatenated once every worker has exited.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use super::stats::PipelineStats;
use crate::movement::{process_trace, AircraftTrace, Geofence, RawTrace, TransitionEvent};

/// Detection result for one aircraft seen inside the geofence
#[derive(Debug, Clone)]
pub struct AircraftMovements {
    pub trace: AircraftTrace,
    pub events: Vec<TransitionEvent>,
}

/// Everything the workers produced, merged
#[derive(Debug, Default)]
pub struct PooledMovements {
    /// Filtered traces, sorted by aircraft identifier
    pub traces: Vec<AircraftTrace>,
    /// All events, sorted by timestamp then aircraft identifier
    pub events: Vec<TransitionEvent>,
}

impl PooledMovements {
    fn merge(results: impl IntoIterator<Item = AircraftMovements>) -> Self {
        let mut pooled = Self::default();
        for result in results {
            pooled.events.extend(result.events);
            pooled.traces.push(result.trace);
        }

        pooled.traces.sort_by(|a, b| a.icao().cmp(b.icao()));
        pooled
            .events
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.icao.cmp(&b.icao)));
        pooled
    }
}

/// Fixed-size pool of detection threads
pub struct DetectionPool {
    input: Sender<RawTrace>,
    results: Receiver<AircraftMovements>,
    workers: Vec<JoinHandle<()>>,
}

impl DetectionPool {
    /// Spawn `workers` threads (at least one) filtering against `geofence`
    pub fn start(workers: usize, geofence: Geofence, stats: Arc<PipelineStats>) -> Result<Self> {
        let workers = workers.max(1);
        let (input_tx, input_rx) = bounded::<RawTrace>(workers * 4);
        let (result_tx, result_rx) = unbounded::<AircraftMovements>();

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let input = input_rx.clone();
            let results = result_tx.clone();
            let stats = stats.clone();

            let handle = thread::Builder::new()
                .name(format!("detect-{}", id))
                .spawn(move || run_worker(input, results, geofence, stats))
                .context("Failed to spawn detection worker")?;
            handles.push(handle);
        }

        info!("Started {} detection workers", workers);
        Ok(Self {
            input: input_tx,
            results: result_rx,
            workers: handles,
        })
    }

    /// Hand a trace to the pool, blocking while all workers are busy.
    ///
    /// Returns false if no worker is left to take it.
    pub fn submit(&self, trace: RawTrace) -> bool {
        self.input.send(trace).is_ok()
    }

    /// Close the input, wait for the workers and merge their results
    pub fn finish(self) -> PooledMovements {
        let Self {
            input,
            results,
            workers,
        } = self;
        drop(input);

        for worker in workers {
            if worker.join().is_err() {
                error!("Detection worker panicked");
            }
        }

        PooledMovements::merge(results.try_iter())
    }
}

fn run_worker(
    input: Receiver<RawTrace>,
    results: Sender<AircraftMovements>,
    geofence: Geofence,
    stats: Arc<PipelineStats>,
) {
    for raw in input.iter() {
        let icao = raw.icao.clone().unwrap_or_else(|| "-".to_string());

        let outcome = match process_trace(raw, &geofence) {
            Ok(outcome) => outcome,
            Err(e) => {
                stats.record_trace_rejected();
                warn!("Skipping trace {}: {}", icao, e);
                continue;
            }
        };

        if !outcome.sample_defects.is_empty() {
            stats.record_samples_dropped(outcome.sample_defects.len());
            for defect in &outcome.sample_defects {
                debug!("Aircraft {}: {}", icao, defect);
            }
        }

        let Some(trace) = outcome.filtered else {
            continue;
        };

        stats.record_aircraft(outcome.events.len());
        debug!(
            "Aircraft {} {}: {} samples in area, {} transitions",
            icao,
            trace.registration().unwrap_or("-"),
            trace.len(),
            outcome.events.len()
        );

        if results
            .send(AircraftMovements {
                trace,
                events: outcome.events,
            })
            .is_err()
        {
            warn!("Result channel closed, stopping worker");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{AltitudeReading, Coordinate, RawSample, TransitionKind};

    fn unit_box() -> Geofence {
        Geofence::new(
            Coordinate { latitude: 1.0, longitude: 0.0 },
            Coordinate { latitude: 0.0, longitude: 1.0 },
        )
        .unwrap()
    }

    fn raw_trace(icao: Option<&str>, start: f64, latitude: f64) -> RawTrace {
        let altitudes = [
            AltitudeReading::Ground,
            AltitudeReading::Feet(800.0),
            AltitudeReading::Ground,
        ];
        RawTrace {
            icao: icao.map(str::to_string),
            registration: None,
            samples: altitudes
                .iter()
                .enumerate()
                .map(|(i, alt)| RawSample {
                    timestamp: Some(start + i as f64 * 60.0),
                    latitude: Some(latitude),
                    longitude: Some(0.5),
                    altitude: *alt,
                })
                .collect(),
        }
    }

    #[test]
    fn test_pool_merges_all_aircraft() {
        let stats = Arc::new(PipelineStats::new());
        let pool = DetectionPool::start(3, unit_box(), stats.clone()).unwrap();

        for i in 0..20 {
            assert!(pool.submit(raw_trace(Some(&format!("{:06X}", i)), i as f64 * 1000.0, 0.5)));
        }
        // Outside the fence
        assert!(pool.submit(raw_trace(Some("AAAAAA"), 0.0, 5.0)));
        // No identifier
        assert!(pool.submit(raw_trace(None, 0.0, 0.5)));

        let pooled = pool.finish();
        assert_eq!(pooled.traces.len(), 20);
        assert_eq!(pooled.events.len(), 40);
        assert!(pooled.traces.windows(2).all(|w| w[0].icao() <= w[1].icao()));
        assert!(pooled.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(pooled.events[0].kind, TransitionKind::Departed);
        assert_eq!(pooled.events[1].kind, TransitionKind::Arrived);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.aircraft_in_area, 20);
        assert_eq!(snapshot.events_detected, 40);
        assert_eq!(snapshot.traces_rejected, 1);
    }

    #[test]
    fn test_zero_workers_still_runs() {
        let stats = Arc::new(PipelineStats::new());
        let pool = DetectionPool::start(0, unit_box(), stats).unwrap();
        assert!(pool.submit(raw_trace(Some("484506"), 0.0, 0.5)));
        assert_eq!(pool.finish().events.len(), 2);
    }
}
