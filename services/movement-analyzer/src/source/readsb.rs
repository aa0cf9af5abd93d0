//! readsb `trace_full_*.json` decoding
//!
//! A trace file is a JSON object, usually gzip-compressed even though the
//! file name ends in `.json`:
//!
//! ```text
//! { "icao": "484506", "r": "PH-BXA", "timestamp": 1691625600.12,
//!   "trace": [[seconds_after_timestamp, lat, lon, altitude|"ground"|null, ...], ...] }
//! ```

use std::io::Read;

use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::movement::{AltitudeReading, RawSample, RawTrace};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Per-file decoding errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected trace file layout: {0}")]
    Shape(&'static str),
}

#[derive(Debug, Deserialize)]
struct TraceFile {
    icao: Option<String>,
    #[serde(rename = "r")]
    registration: Option<String>,
    /// Base time the row offsets are relative to
    timestamp: Option<f64>,
    trace: Option<Vec<Value>>,
}

/// Decode a trace file, gzip-compressed or plain
pub fn parse_trace_bytes(bytes: &[u8]) -> Result<RawTrace, SourceError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut decoded)?;
        parse_trace_json(&decoded)
    } else {
        parse_trace_json(bytes)
    }
}

fn parse_trace_json(json: &[u8]) -> Result<RawTrace, SourceError> {
    let file: TraceFile = serde_json::from_slice(json)?;
    let rows = file.trace.ok_or(SourceError::Shape("missing trace array"))?;

    // Without a base time the offsets are taken as absolute epoch seconds
    let base = file.timestamp.unwrap_or(0.0);

    Ok(RawTrace {
        icao: file.icao,
        registration: file.registration,
        samples: rows.iter().map(|row| sample_from_row(row, base)).collect(),
    })
}

/// Rows that are not arrays, or have non-numeric fields, become samples
/// with missing fields and are rejected during validation.
fn sample_from_row(row: &Value, base: f64) -> RawSample {
    let field = |i: usize| row.get(i).and_then(Value::as_f64);

    RawSample {
        timestamp: field(0).map(|offset| base + offset),
        latitude: field(1),
        longitude: field(2),
        altitude: altitude_from_json(row.get(3)),
    }
}

/// Map the altitude column: a number is an altitude, `"ground"` is the
/// explicit ground marker, anything else is unavailable.
pub fn altitude_from_json(value: Option<&Value>) -> AltitudeReading {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .map_or(AltitudeReading::Unavailable, AltitudeReading::Feet),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("ground") => AltitudeReading::Ground,
        _ => AltitudeReading::Unavailable,
    }
}
