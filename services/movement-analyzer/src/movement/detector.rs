//! Ground/airborne transition detection for a single aircraft

use super::error::MovementError;
use super::geofence::Geofence;
use super::types::{AircraftTrace, FlightState, RawTrace, TransitionEvent, TransitionKind};

/// Detect transitions in one trace.
///
/// Emits an event whenever the state of a sample differs from the state of
/// the sample before it. Events come out in sample order.
pub fn detect_transitions(trace: &AircraftTrace) -> Vec<TransitionEvent> {
    let mut events = Vec::new();
    let mut previous: Option<FlightState> = None;

    for sample in trace.samples() {
        let current = sample.flight_state();

        if let Some(prev) = previous {
            if prev != current {
                let kind = match current {
                    FlightState::Airborne => TransitionKind::Departed,
                    FlightState::Ground => TransitionKind::Arrived,
                };
                events.push(TransitionEvent {
                    icao: trace.icao().to_string(),
                    registration: trace.registration().map(str::to_string),
                    timestamp: sample.timestamp,
                    kind,
                });
            }
        }

        previous = Some(current);
    }

    events
}

/// Outcome of running one raw trace through validation, filtering and detection
#[derive(Debug, Clone)]
pub struct TraceOutcome {
    /// The trace restricted to the geofence, `None` if nothing was inside
    pub filtered: Option<AircraftTrace>,
    pub events: Vec<TransitionEvent>,
    /// Samples dropped during validation
    pub sample_defects: Vec<MovementError>,
}

/// Validate, filter and detect one aircraft.
///
/// Fails with `MalformedTrace` when the trace has no usable identifier; the
/// caller is expected to skip it and carry on. Malformed samples never reach
/// the detector, so the previous state carries over from the last valid one.
pub fn process_trace(raw: RawTrace, geofence: &Geofence) -> Result<TraceOutcome, MovementError> {
    let validated = raw.validate()?;
    let filtered = geofence.filter_trace(&validated.trace);

    if filtered.is_empty() {
        return Ok(TraceOutcome {
            filtered: None,
            events: Vec::new(),
            sample_defects: validated.defects,
        });
    }

    let events = detect_transitions(&filtered);
    Ok(TraceOutcome {
        filtered: Some(filtered),
        events,
        sample_defects: validated.defects,
    })
}
