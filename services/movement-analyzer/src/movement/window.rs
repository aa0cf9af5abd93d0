//! Busiest rolling window over a pooled set of transition events
//!
//! Candidate windows are half-open `[t, t + window)` intervals anchored at
//! the timestamp of an actual event. The earliest start reaching the maximum
//! count wins.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::MovementError;
use super::types::{Timestamp, TransitionEvent, TransitionKind};

/// Default window length
pub const ONE_HOUR_SECS: i64 = 3600;

/// Busiest window found in an event set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusiestWindow {
    /// Window start, always the timestamp of one of the input events
    pub start: Timestamp,
    /// Window length in seconds
    pub window_secs: i64,
    pub arrivals: usize,
    pub departures: usize,
    /// `arrivals + departures`
    pub total: usize,
}

impl BusiestWindow {
    /// Exclusive end of the window
    pub fn end(&self) -> Timestamp {
        self.start.saturating_add(self.window_secs)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start, 0)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end(), 0)
    }
}

impl std::fmt::Display for BusiestWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => write!(
                f,
                "{} - {}",
                start.format("%Y-%m-%d %H:%M:%S"),
                end.format("%Y-%m-%d %H:%M:%S UTC")
            )?,
            _ => write!(f, "t={}..{}", self.start, self.end())?,
        }
        write!(
            f,
            ": {} arrivals, {} departures, {} movements",
            self.arrivals, self.departures, self.total
        )
    }
}

/// Busiest one-hour window
pub fn find_busiest_window(events: &[TransitionEvent]) -> Result<BusiestWindow, MovementError> {
    find_busiest_window_over(events, ONE_HOUR_SECS)
}

/// Busiest window of `window_secs` seconds.
///
/// Sorts a copy of the event times and sweeps two pointers over it, so the
/// cost is dominated by the sort. Input order does not matter.
pub fn find_busiest_window_over(
    events: &[TransitionEvent],
    window_secs: i64,
) -> Result<BusiestWindow, MovementError> {
    if window_secs <= 0 {
        return Err(MovementError::InvalidWindow(window_secs));
    }
    if events.is_empty() {
        return Err(MovementError::EmptyInput);
    }

    let mut sorted: Vec<(Timestamp, TransitionKind)> =
        events.iter().map(|e| (e.timestamp, e.kind)).collect();
    sorted.sort_by_key(|&(timestamp, _)| timestamp);

    // arrivals_before[i] = arrivals among sorted[..i]
    let mut arrivals_before = Vec::with_capacity(sorted.len() + 1);
    arrivals_before.push(0usize);
    for &(_, kind) in &sorted {
        let last = arrivals_before[arrivals_before.len() - 1];
        arrivals_before.push(last + usize::from(kind == TransitionKind::Arrived));
    }

    let mut best: Option<BusiestWindow> = None;
    let mut end = 0;

    for start in 0..sorted.len() {
        let anchor = sorted[start].0;

        // Equal timestamps share a window; the first of them sees every event
        if start > 0 && sorted[start - 1].0 == anchor {
            continue;
        }

        let limit = anchor.saturating_add(window_secs);
        end = end.max(start);
        while end < sorted.len() && sorted[end].0 < limit {
            end += 1;
        }

        let total = end - start;
        if best.map_or(true, |b| total > b.total) {
            let arrivals = arrivals_before[end] - arrivals_before[start];
            best = Some(BusiestWindow {
                start: anchor,
                window_secs,
                arrivals,
                departures: total - arrivals,
                total,
            });
        }
    }

    best.ok_or(MovementError::EmptyInput)
}
