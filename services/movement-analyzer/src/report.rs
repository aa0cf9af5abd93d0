//! Analysis summary - logging and optional JSON output

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::movement::{
    busiest_day, busiest_windows_by_day, find_busiest_window, find_busiest_window_over,
    AircraftTrace, BusiestWindow, DailySummary, Geofence, MovementCounts, MovementError,
    TransitionEvent, ONE_HOUR_SECS,
};
use crate::pipeline::StatsSnapshot;

/// Busiest calendar day by movement count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusiestDay {
    pub date: NaiveDate,
    pub movements: MovementCounts,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub geofence: Geofence,
    pub stats: StatsSnapshot,
    pub movements: MovementCounts,
    /// `None` when no events were detected
    pub busiest_window: Option<BusiestWindow>,
    pub busiest_day: Option<BusiestDay>,
    pub daily: Vec<DailySummary>,
    pub events: Vec<TransitionEvent>,
}

impl AnalysisReport {
    /// Aggregate pooled events.
    ///
    /// An empty event set yields a report without windows rather than a
    /// zero-valued one; only an invalid window length is an error.
    pub fn build(
        geofence: Geofence,
        stats: StatsSnapshot,
        events: Vec<TransitionEvent>,
        window_secs: i64,
    ) -> Result<Self, MovementError> {
        let overall = match window_secs {
            ONE_HOUR_SECS => find_busiest_window(&events),
            secs => find_busiest_window_over(&events, secs),
        };
        let busiest_window = match overall {
            Ok(window) => Some(window),
            Err(MovementError::EmptyInput) => None,
            Err(e) => return Err(e),
        };

        let day = match busiest_day(&events) {
            Ok((date, movements)) => Some(BusiestDay { date, movements }),
            Err(MovementError::EmptyInput) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            geofence,
            stats,
            movements: MovementCounts::tally(&events),
            busiest_window,
            busiest_day: day,
            daily: busiest_windows_by_day(&events, window_secs)?,
            events,
        })
    }

    /// Log the summary
    pub fn log(&self) {
        for event in &self.events {
            debug!(
                "{} {} {} {}",
                event.timestamp,
                event.icao,
                event.registration.as_deref().unwrap_or("-"),
                event.kind
            );
        }

        info!("===========================================");
        info!("  Results");
        info!("===========================================");
        info!("  {}", self.stats);
        info!("  {}", self.movements);

        for day in &self.daily {
            info!(
                "  {}: {} movements, busiest window {}",
                day.date, day.movements.total, day.busiest
            );
        }

        match (&self.busiest_window, &self.busiest_day) {
            (Some(window), Some(day)) => {
                info!("  Busiest window: {}", window);
                info!(
                    "  Busiest day: {} with {} movements ({} arrivals, {} departures)",
                    day.date, day.movements.total, day.movements.arrivals, day.movements.departures
                );
            }
            _ => warn!("  No movements detected inside the geofence"),
        }
    }

    /// Write the report as pretty-printed JSON
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report saved to {:?}", path);
        Ok(())
    }
}

/// Write the geofence-filtered traces as pretty-printed JSON
pub async fn write_filtered_traces(traces: &[AircraftTrace], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(traces).context("Failed to serialize filtered traces")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write filtered traces to {:?}", path))?;
    info!("Filtered trace data for {} aircraft saved to {:?}", traces.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::TransitionKind;

    fn event(timestamp: i64, kind: TransitionKind) -> TransitionEvent {
        TransitionEvent {
            icao: "484506".to_string(),
            registration: None,
            timestamp,
            kind,
        }
    }

    #[test]
    fn test_build() {
        let events = vec![
            event(1_691_654_400, TransitionKind::Departed),
            event(1_691_655_400, TransitionKind::Arrived),
            event(1_691_700_000, TransitionKind::Arrived),
        ];
        let report =
            AnalysisReport::build(Geofence::schiphol(), StatsSnapshot::default(), events, 3600)
                .unwrap();

        assert_eq!(report.movements.total, 3);
        let window = report.busiest_window.unwrap();
        assert_eq!(window.start, 1_691_654_400);
        assert_eq!(window.total, 2);
        assert_eq!(report.busiest_day.unwrap().movements.total, 3);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.events.len(), 3);
    }

    #[test]
    fn test_build_with_shorter_window() {
        let events = vec![
            event(1_691_654_400, TransitionKind::Departed),
            event(1_691_655_400, TransitionKind::Arrived),
            event(1_691_655_500, TransitionKind::Arrived),
        ];
        let report =
            AnalysisReport::build(Geofence::schiphol(), StatsSnapshot::default(), events, 600)
                .unwrap();

        let window = report.busiest_window.unwrap();
        assert_eq!(window.start, 1_691_655_400);
        assert_eq!(window.end(), 1_691_656_000);
        assert_eq!(window.total, 2);
    }

    #[test]
    fn test_build_without_events() {
        let report =
            AnalysisReport::build(Geofence::schiphol(), StatsSnapshot::default(), vec![], 3600)
                .unwrap();
        assert!(report.busiest_window.is_none());
        assert!(report.busiest_day.is_none());
        assert!(report.daily.is_empty());
        assert_eq!(report.movements, MovementCounts::default());
    }

    #[test]
    fn test_build_rejects_bad_window() {
        let result = AnalysisReport::build(
            Geofence::schiphol(),
            StatsSnapshot::default(),
            vec![event(0, TransitionKind::Arrived)],
            0,
        );
        assert!(matches!(result, Err(MovementError::InvalidWindow(0))));
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = AnalysisReport::build(
            Geofence::schiphol(),
            StatsSnapshot::default(),
            vec![event(1_691_654_400, TransitionKind::Departed)],
            3600,
        )
        .unwrap();

        report.write_json(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["movements"]["departures"], 1);
        assert_eq!(written["busiest_window"]["start"], 1_691_654_400);
        assert_eq!(written["events"][0]["kind"], "departed");
        assert_eq!(written["busiest_day"]["date"], "2023-08-10");
    }
}
