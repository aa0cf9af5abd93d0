//! Movement analysis core
//!
//! Geofence filtering, ground/airborne transition detection and the
//! busiest-window aggregation over pooled events.

mod daily;
mod detector;
mod error;
mod geofence;
mod types;
mod window;

pub use daily::{busiest_day, busiest_windows_by_day, DailySummary, MovementCounts};
pub use detector::{detect_transitions, process_trace, TraceOutcome};
pub use error::MovementError;
pub use geofence::{Coordinate, Geofence};
pub use types::{
    AircraftTrace, AltitudeReading, FlightState, PositionSample, RawSample, RawTrace, Timestamp,
    TransitionEvent, TransitionKind, ValidatedTrace,
};
pub use window::{find_busiest_window, find_busiest_window_over, BusiestWindow, ONE_HOUR_SECS};
