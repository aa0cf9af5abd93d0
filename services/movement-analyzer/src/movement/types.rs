//! Trace and movement data types

use serde::{Deserialize, Serialize};

use super::error::MovementError;

/// Seconds since the Unix epoch
pub type Timestamp = i64;

/// Altitude field of a position sample as delivered by the trace source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeReading {
    /// Barometric altitude in feet
    Feet(f64),
    /// Explicit on-ground marker
    Ground,
    /// Null, absent, or some encoding we do not recognise
    Unavailable,
}

/// Binary flight state of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightState {
    Ground,
    Airborne,
}

impl AltitudeReading {
    /// Classify the reading.
    ///
    /// Only a well-formed number counts as airborne. Every other encoding,
    /// including an unavailable altitude, is treated as ground: feeds disagree
    /// on how "on ground" is written, and ground is the fail-safe choice.
    pub fn flight_state(&self) -> FlightState {
        match self {
            Self::Feet(ft) if ft.is_finite() => FlightState::Airborne,
            _ => FlightState::Ground,
        }
    }
}

/// Validated position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Seconds since epoch
    pub timestamp: Timestamp,

    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,

    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,

    /// Reported altitude
    pub altitude: AltitudeReading,
}

impl PositionSample {
    pub fn flight_state(&self) -> FlightState {
        self.altitude.flight_state()
    }
}

/// Position history of one aircraft.
///
/// Only constructible with a non-empty identifier. Never mutated after
/// construction; filtering builds a new trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftTrace {
    icao: String,
    registration: Option<String>,
    samples: Vec<PositionSample>,
}

impl AircraftTrace {
    pub fn new(
        icao: impl Into<String>,
        registration: Option<String>,
        samples: Vec<PositionSample>,
    ) -> Result<Self, MovementError> {
        let icao = icao.into();
        if icao.trim().is_empty() {
            return Err(MovementError::MalformedTrace {
                reason: "empty aircraft identifier",
            });
        }

        Ok(Self {
            icao,
            registration: registration.filter(|r| !r.trim().is_empty()),
            samples,
        })
    }

    pub fn icao(&self) -> &str {
        &self.icao
    }

    pub fn registration(&self) -> Option<&str> {
        self.registration.as_deref()
    }

    pub fn samples(&self) -> &[PositionSample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Same aircraft, different samples
    pub(crate) fn with_samples(&self, samples: Vec<PositionSample>) -> Self {
        Self {
            icao: self.icao.clone(),
            registration: self.registration.clone(),
            samples,
        }
    }
}

/// Kind of ground/airborne transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Ground to airborne
    Departed,
    /// Airborne to ground
    Arrived,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Departed => write!(f, "departed"),
            Self::Arrived => write!(f, "arrived"),
        }
    }
}

/// Detected state change of one aircraft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub icao: String,
    pub registration: Option<String>,
    /// Timestamp of the sample that triggered the transition
    pub timestamp: Timestamp,
    pub kind: TransitionKind,
}

/// Sample as handed over by the trace source, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Seconds since epoch, possibly fractional
    pub timestamp: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: AltitudeReading,
}

impl RawSample {
    /// Validate into a [`PositionSample`], `index` is only used for reporting
    pub fn validate(&self, index: usize) -> Result<PositionSample, MovementError> {
        let timestamp = self
            .timestamp
            .filter(|t| t.is_finite())
            .ok_or(MovementError::MalformedSample {
                index,
                reason: "missing or non-finite timestamp",
            })?;

        let latitude = self
            .latitude
            .filter(|lat| lat.is_finite() && lat.abs() <= 90.0)
            .ok_or(MovementError::MalformedSample {
                index,
                reason: "missing or out-of-range latitude",
            })?;

        let longitude = self
            .longitude
            .filter(|lon| lon.is_finite() && lon.abs() <= 180.0)
            .ok_or(MovementError::MalformedSample {
                index,
                reason: "missing or out-of-range longitude",
            })?;

        Ok(PositionSample {
            timestamp: timestamp.floor() as Timestamp,
            latitude,
            longitude,
            altitude: self.altitude,
        })
    }
}

/// Trace as handed over by the trace source, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrace {
    pub icao: Option<String>,
    pub registration: Option<String>,
    pub samples: Vec<RawSample>,
}

/// Result of validating a [`RawTrace`]
#[derive(Debug, Clone)]
pub struct ValidatedTrace {
    pub trace: AircraftTrace,
    /// Samples dropped during validation, one `MalformedSample` each
    pub defects: Vec<MovementError>,
}

impl RawTrace {
    /// Validate at the boundary.
    ///
    /// A missing identifier rejects the whole trace. Malformed samples are
    /// dropped and reported in [`ValidatedTrace::defects`]; the surviving
    /// samples keep their original order.
    pub fn validate(self) -> Result<ValidatedTrace, MovementError> {
        let icao = self.icao.ok_or(MovementError::MalformedTrace {
            reason: "missing aircraft identifier",
        })?;

        let mut samples = Vec::with_capacity(self.samples.len());
        let mut defects = Vec::new();
        for (index, raw) in self.samples.iter().enumerate() {
            match raw.validate(index) {
                Ok(sample) => samples.push(sample),
                Err(e) => defects.push(e),
            }
        }

        let trace = AircraftTrace::new(icao, self.registration, samples)?;
        Ok(ValidatedTrace { trace, defects })
    }
}
