//! Trace source: readsb trace files on disk
//!
//! Finds `trace_full_*.json` files, decompresses and decodes them into raw
//! traces. Errors are reported per file and never stop the run.

mod loader;
mod readsb;

pub use loader::{discover_trace_files, load_trace_files, select_fraction, Discovery, LoadedTrace};
pub use readsb::{parse_trace_bytes, SourceError};
