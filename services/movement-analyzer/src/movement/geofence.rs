//! Rectangular geofence and trace filtering

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MovementError;
use super::types::AircraftTrace;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Lat/lon bounding box given by its north-west and south-east corners.
///
/// All four edges are inclusive. Boxes crossing the antimeridian are not
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geofence {
    north_west: Coordinate,
    south_east: Coordinate,
}

impl Geofence {
    pub fn new(north_west: Coordinate, south_east: Coordinate) -> Result<Self, MovementError> {
        let finite = [
            north_west.latitude,
            north_west.longitude,
            south_east.latitude,
            south_east.longitude,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(MovementError::InvalidGeofence(
                "corner coordinates must be finite".to_string(),
            ));
        }
        if north_west.latitude < south_east.latitude {
            return Err(MovementError::InvalidGeofence(format!(
                "north edge {} is below south edge {}",
                north_west.latitude, south_east.latitude
            )));
        }
        if north_west.longitude > south_east.longitude {
            return Err(MovementError::InvalidGeofence(format!(
                "west edge {} is east of east edge {}",
                north_west.longitude, south_east.longitude
            )));
        }

        Ok(Self {
            north_west,
            south_east,
        })
    }

    /// Area around Amsterdam Schiphol
    pub fn schiphol() -> Self {
        Self {
            north_west: Coordinate {
                latitude: 52.392124353727276,
                longitude: 4.65390042931,
            },
            south_east: Coordinate {
                latitude: 52.2632215325,
                longitude: 4.84323226670213,
            },
        }
    }

    pub fn north_west(&self) -> Coordinate {
        self.north_west
    }

    pub fn south_east(&self) -> Coordinate {
        self.south_east
    }

    /// Check if a point is within the box (edges included)
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.south_east.latitude <= latitude
            && latitude <= self.north_west.latitude
            && self.north_west.longitude <= longitude
            && longitude <= self.south_east.longitude
    }

    /// Keep only the samples inside the box, in their original order
    pub fn filter_trace(&self, trace: &AircraftTrace) -> AircraftTrace {
        let samples = trace
            .samples()
            .iter()
            .filter(|s| self.contains(s.latitude, s.longitude))
            .copied()
            .collect();
        trace.with_samples(samples)
    }
}

/// Parses `"nw_lat,nw_lon;se_lat,se_lon"`
impl FromStr for Geofence {
    type Err = MovementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MovementError::InvalidGeofence(format!("cannot parse '{}'", s));

        let (nw, se) = s.split_once(';').ok_or_else(invalid)?;
        let parse_corner = |corner: &str| -> Result<Coordinate, MovementError> {
            let (lat, lon) = corner.split_once(',').ok_or_else(invalid)?;
            Ok(Coordinate {
                latitude: lat.trim().parse().map_err(|_| invalid())?,
                longitude: lon.trim().parse().map_err(|_| invalid())?,
            })
        };

        Self::new(parse_corner(nw)?, parse_corner(se)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::types::{AltitudeReading, PositionSample};

    fn unit_box() -> Geofence {
        Geofence::new(
            Coordinate { latitude: 1.0, longitude: 0.0 },
            Coordinate { latitude: 0.0, longitude: 1.0 },
        )
        .unwrap()
    }

    fn sample(timestamp: i64, latitude: f64, longitude: f64) -> PositionSample {
        PositionSample {
            timestamp,
            latitude,
            longitude,
            altitude: AltitudeReading::Ground,
        }
    }

    #[test]
    fn test_contains_edges_inclusive() {
        let fence = unit_box();
        assert!(fence.contains(0.0, 0.0));
        assert!(fence.contains(1.0, 1.0));
        assert!(fence.contains(0.0, 1.0));
        assert!(fence.contains(1.0, 0.0));
        assert!(fence.contains(0.5, 0.5));
        assert!(!fence.contains(1.0000001, 0.5));
        assert!(!fence.contains(-0.0000001, 0.5));
        assert!(!fence.contains(0.5, -0.0000001));
        assert!(!fence.contains(0.5, 1.0000001));
    }

    #[test]
    fn test_schiphol_contains_runway() {
        let fence = Geofence::schiphol();
        // Polderbaan threshold area
        assert!(fence.contains(52.36, 4.71));
        // Amsterdam centre
        assert!(!fence.contains(52.37, 4.90));
    }

    #[test]
    fn test_filter_preserves_order() {
        let trace = AircraftTrace::new(
            "484506",
            Some("PH-BXA".to_string()),
            vec![
                sample(0, 0.5, 0.5),
                sample(10, 2.0, 0.5),
                sample(20, 0.2, 0.9),
                sample(30, 0.5, -3.0),
                sample(40, 1.0, 1.0),
            ],
        )
        .unwrap();

        let filtered = unit_box().filter_trace(&trace);
        let timestamps: Vec<_> = filtered.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![0, 20, 40]);
        assert_eq!(filtered.icao(), "484506");
        assert_eq!(filtered.registration(), Some("PH-BXA"));
        // Source trace untouched
        assert_eq!(trace.len(), 5);
    }

    #[test]
    fn test_filter_idempotent() {
        let trace = AircraftTrace::new(
            "484506",
            None,
            vec![sample(0, 0.5, 0.5), sample(10, 5.0, 5.0), sample(20, 1.0, 0.0)],
        )
        .unwrap();

        let fence = unit_box();
        let once = fence.filter_trace(&trace);
        let twice = fence.filter_trace(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_outside_yields_empty() {
        let trace = AircraftTrace::new("484506", None, vec![sample(0, 10.0, 10.0)]).unwrap();
        assert!(unit_box().filter_trace(&trace).is_empty());
    }

    #[test]
    fn test_new_rejects_inverted_box() {
        let result = Geofence::new(
            Coordinate { latitude: 0.0, longitude: 0.0 },
            Coordinate { latitude: 1.0, longitude: 1.0 },
        );
        assert!(matches!(result, Err(MovementError::InvalidGeofence(_))));

        let result = Geofence::new(
            Coordinate { latitude: 1.0, longitude: 1.0 },
            Coordinate { latitude: 0.0, longitude: 0.0 },
        );
        assert!(matches!(result, Err(MovementError::InvalidGeofence(_))));
    }

    #[test]
    fn test_parse() {
        let fence: Geofence = "52.392124353727276,4.65390042931;52.2632215325,4.84323226670213"
            .parse()
            .unwrap();
        assert_eq!(fence, Geofence::schiphol());

        assert!("52.3,4.6".parse::<Geofence>().is_err());
        assert!("a,b;c,d".parse::<Geofence>().is_err());
        assert!("0,0;1,1".parse::<Geofence>().is_err());
    }
}
