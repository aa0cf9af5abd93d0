//! Detection pipeline - worker pool and run statistics

mod pool;
mod stats;

pub use pool::{AircraftMovements, DetectionPool, PooledMovements};
pub use stats::{PipelineStats, StatsSnapshot};
