//! Low-overhead microbenchmark engine.
//!
//! A unit of work is run a fixed number of times. Each run is bracketed by
//! two clock reads and ordering barriers, and the per-iteration samples are
//! folded into a running min/max/total. The summary is printed as:
//!
//! ```text
//! [label]
//! Avg     <float> <unit>
//! Min     <int> <unit>
//! Max     <int> <unit>
//! Runs    <int>
//! ```
//!
//! ```no_run
//! let result = microbench::run_benchmark("noop", 1000, || {})?;
//! assert_eq!(result.iterations, 1000);
//! # Ok::<(), microbench::BenchError>(())
//! ```

use clap::ValueEnum;

pub mod aggregate;
pub mod benches;
pub mod clock;
pub mod config;
pub mod error;
pub mod harness;
pub mod inputs;
pub mod report;
pub mod schema;

pub use aggregate::{Aggregate, Sample};
pub use clock::{Clock, CycleCounter, Timestamp, Unit, WallClock};
pub use config::{BenchConfig, Iterations, Profile, RegressionPolicy};
pub use error::BenchError;
pub use harness::{run_benchmark, Bench};
pub use report::{BatchedResult, BenchmarkResult};

/// Clock used by [`run_benchmark`] and [`bench!`].
#[cfg(not(feature = "cycle-counter"))]
pub type DefaultClock = WallClock;

/// Clock used by [`run_benchmark`] and [`bench!`].
#[cfg(feature = "cycle-counter")]
pub type DefaultClock = CycleCounter;

/// Clock backend for one CLI invocation.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum ClockKind {
    /// Monotonic wall clock, nanoseconds.
    #[default]
    Wall,
    /// Hardware cycle counter, raw cycles.
    Cycles,
}

impl ClockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockKind::Wall => "wall",
            ClockKind::Cycles => "cycles",
        }
    }
}

/// Benchmark a block on the default clock and print its report.
///
/// ```no_run
/// use microbench::bench;
///
/// let mut x = 0u64;
/// bench!("shift", 1000, { x = (x << 3) | (x >> 5); })?;
/// bench!(1000, { std::hint::black_box(x.count_ones()) })?;
/// # Ok::<(), microbench::BenchError>(())
/// ```
///
/// Without an explicit label the block's source text is used.
#[macro_export]
macro_rules! bench {
    ($label:expr, $iterations:expr, $body:block) => {
        $crate::run_benchmark($label, $iterations, || $body)
    };
    ($iterations:expr, $body:block) => {
        $crate::run_benchmark(stringify!($body), $iterations, || $body)
    };
}
