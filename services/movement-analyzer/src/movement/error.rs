//! Movement analysis error types

use thiserror::Error;

/// Errors raised by validation, detection and aggregation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MovementError {
    /// A sample lacks a required field; the sample is dropped and detection continues
    #[error("malformed sample at index {index}: {reason}")]
    MalformedSample { index: usize, reason: &'static str },

    /// The trace cannot be attributed to an aircraft; the whole trace is skipped
    #[error("malformed trace: {reason}")]
    MalformedTrace { reason: &'static str },

    /// Aggregation over zero events has no meaningful window
    #[error("no transition events to aggregate")]
    EmptyInput,

    #[error("invalid geofence: {0}")]
    InvalidGeofence(String),

    #[error("invalid window length: {0} seconds")]
    InvalidWindow(i64),
}
