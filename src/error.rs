use thiserror::Error;

use crate::clock::Timestamp;

/// Errors produced while configuring, running, or reporting a benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The iteration count was not a positive integer.
    #[error("iteration count must be positive, got {iterations}")]
    InvalidIterations { iterations: u64 },

    /// The timestamp source could not be read. There is no fallback clock.
    #[error("{clock} clock unavailable: {reason}")]
    ClockUnavailable { clock: &'static str, reason: String },

    /// An end timestamp was observed before its start timestamp.
    #[error("clock went backwards: start={start} end={end}")]
    ClockRegression { start: Timestamp, end: Timestamp },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
