//! Movement tallies and per-day summaries

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use super::error::MovementError;
use super::types::{Timestamp, TransitionEvent, TransitionKind};
use super::window::{find_busiest_window_over, BusiestWindow};

/// Arrival/departure counts of an event set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementCounts {
    pub arrivals: usize,
    pub departures: usize,
    pub total: usize,
}

impl MovementCounts {
    pub fn tally(events: &[TransitionEvent]) -> Self {
        let arrivals = events
            .iter()
            .filter(|e| e.kind == TransitionKind::Arrived)
            .count();
        Self {
            arrivals,
            departures: events.len() - arrivals,
            total: events.len(),
        }
    }
}

impl std::fmt::Display for MovementCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Arrivals: {}, Departures: {}, Total movements: {}",
            self.arrivals, self.departures, self.total
        )
    }
}

/// Busiest window of one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub movements: MovementCounts,
    pub busiest: BusiestWindow,
}

fn utc_date(timestamp: Timestamp) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Group events by the UTC day of their timestamp, in date order
fn group_by_day(events: &[TransitionEvent]) -> BTreeMap<NaiveDate, Vec<TransitionEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<TransitionEvent>> = BTreeMap::new();
    let mut unrepresentable = 0usize;

    for event in events {
        match utc_date(event.timestamp) {
            Some(date) => days.entry(date).or_default().push(event.clone()),
            None => unrepresentable += 1,
        }
    }

    if unrepresentable > 0 {
        warn!(
            "{} events have timestamps outside the calendar range and were not grouped",
            unrepresentable
        );
    }
    days
}

/// One busiest window per UTC day.
///
/// A window only counts events of its own day, so a window starting late in
/// the evening does not borrow movements from the next morning.
pub fn busiest_windows_by_day(
    events: &[TransitionEvent],
    window_secs: i64,
) -> Result<Vec<DailySummary>, MovementError> {
    if window_secs <= 0 {
        return Err(MovementError::InvalidWindow(window_secs));
    }

    group_by_day(events)
        .into_iter()
        .map(|(date, day_events)| {
            Ok(DailySummary {
                date,
                movements: MovementCounts::tally(&day_events),
                busiest: find_busiest_window_over(&day_events, window_secs)?,
            })
        })
        .collect()
}

/// Day with the most movements; the earliest day wins ties
pub fn busiest_day(
    events: &[TransitionEvent],
) -> Result<(NaiveDate, MovementCounts), MovementError> {
    let mut best: Option<(NaiveDate, MovementCounts)> = None;

    for (date, day_events) in group_by_day(events) {
        let counts = MovementCounts::tally(&day_events);
        if best.map_or(true, |(_, b)| counts.total > b.total) {
            best = Some((date, counts));
        }
    }

    best.ok_or(MovementError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-08-10 00:00:00 UTC
    const AUG_10: Timestamp = 1_691_625_600;
    const DAY: Timestamp = 86_400;

    fn event(timestamp: Timestamp, kind: TransitionKind) -> TransitionEvent {
        TransitionEvent {
            icao: "484506".to_string(),
            registration: Some("PH-BXA".to_string()),
            timestamp,
            kind,
        }
    }

    #[test]
    fn test_tally() {
        let events = vec![
            event(0, TransitionKind::Arrived),
            event(1, TransitionKind::Departed),
            event(2, TransitionKind::Departed),
        ];
        let counts = MovementCounts::tally(&events);
        assert_eq!(
            counts,
            MovementCounts {
                arrivals: 1,
                departures: 2,
                total: 3
            }
        );
        assert_eq!(MovementCounts::tally(&[]), MovementCounts::default());
    }

    #[test]
    fn test_busiest_windows_by_day() {
        let events = vec![
            // Day two, listed first on purpose
            event(AUG_10 + DAY + 7 * 3600, TransitionKind::Departed),
            // Day one: three movements between 08:00 and 08:40
            event(AUG_10 + 8 * 3600, TransitionKind::Departed),
            event(AUG_10 + 8 * 3600 + 1200, TransitionKind::Arrived),
            event(AUG_10 + 8 * 3600 + 2400, TransitionKind::Arrived),
            event(AUG_10 + 20 * 3600, TransitionKind::Departed),
            // Late on day one; the window must not pull in day two
            event(AUG_10 + DAY - 600, TransitionKind::Arrived),
            event(AUG_10 + DAY + 100, TransitionKind::Arrived),
        ];

        let days = busiest_windows_by_day(&events, 3600).unwrap();
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2023, 8, 10).unwrap());
        assert_eq!(days[0].movements.total, 5);
        assert_eq!(days[0].busiest.start, AUG_10 + 8 * 3600);
        assert_eq!(days[0].busiest.total, 3);
        assert_eq!(days[0].busiest.arrivals, 2);

        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2023, 8, 11).unwrap());
        assert_eq!(days[1].movements.total, 2);
        assert_eq!(days[1].busiest.start, AUG_10 + DAY + 100);
        assert_eq!(days[1].busiest.total, 1);
    }

    #[test]
    fn test_busiest_windows_by_day_empty() {
        assert!(busiest_windows_by_day(&[], 3600).unwrap().is_empty());
        assert_eq!(
            busiest_windows_by_day(&[], -5),
            Err(MovementError::InvalidWindow(-5))
        );
    }

    #[test]
    fn test_busiest_day() {
        let events = vec![
            event(AUG_10 + 10, TransitionKind::Departed),
            event(AUG_10 + DAY + 10, TransitionKind::Departed),
            event(AUG_10 + DAY + 20, TransitionKind::Arrived),
            event(AUG_10 + 2 * DAY + 10, TransitionKind::Arrived),
            event(AUG_10 + 2 * DAY + 20, TransitionKind::Arrived),
        ];

        let (date, counts) = busiest_day(&events).unwrap();
        // Days two and three tie, the earlier one wins
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 8, 11).unwrap());
        assert_eq!(counts.total, 2);
        assert_eq!(counts.arrivals, 1);
    }

    #[test]
    fn test_busiest_day_empty() {
        assert_eq!(busiest_day(&[]), Err(MovementError::EmptyInput));
    }
}
