//! Benchmark results and their text rendering.
//!
//! Numbers are printed without locale-specific grouping: averages with two
//! decimals, counts as plain integers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, Sample};
use crate::clock::Unit;
use crate::config::Iterations;
use crate::error::BenchError;

const NANOS_PER_SEC: f64 = 1e9;

/// Outcome of a per-iteration benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub label: String,
    pub unit: Unit,
    pub clock: String,

    /// Times the unit of work ran.
    pub iterations: u64,
    /// Samples folded into the statistics; `iterations - discarded`.
    pub samples: u64,
    /// Samples dropped because the clock went backwards.
    pub discarded: u64,

    pub total: u64,
    pub min: u64,
    pub max: u64,
    pub average: f64,

    /// Iterations per second of measured time. Wall-clock runs only.
    pub throughput_per_s: Option<f64>,
}

impl BenchmarkResult {
    /// Finalize an aggregate into a result. The aggregate is consumed.
    pub fn from_aggregate(
        label: &str,
        unit: Unit,
        clock: &str,
        iterations: Iterations,
        aggregate: Aggregate,
    ) -> Result<Self, BenchError> {
        let (Some(min), Some(max), Some(average)) =
            (aggregate.min(), aggregate.max(), aggregate.mean())
        else {
            let (start, end) = aggregate.last_regression().unwrap_or_default();
            return Err(BenchError::ClockRegression { start, end });
        };

        Ok(Self {
            label: label.to_string(),
            unit,
            clock: clock.to_string(),
            iterations: iterations.get(),
            samples: aggregate.count(),
            discarded: aggregate.discarded(),
            total: aggregate.total(),
            min,
            max,
            average,
            throughput_per_s: throughput(unit, aggregate.count(), aggregate.total()),
        })
    }
}

fn throughput(unit: Unit, runs: u64, total: u64) -> Option<f64> {
    if !unit.is_time() || total == 0 {
        return None;
    }
    Some(runs as f64 / (total as f64 / NANOS_PER_SEC))
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.suffix();
        writeln!(f, "[{}]", self.label)?;
        writeln!(f, "Avg     {:.2} {unit}", self.average)?;
        writeln!(f, "Min     {} {unit}", self.min)?;
        writeln!(f, "Max     {} {unit}", self.max)?;
        writeln!(f, "Runs    {}", self.iterations)?;
        if self.discarded > 0 {
            writeln!(f, "Dropped {}", self.discarded)?;
        }
        if let Some(rate) = self.throughput_per_s {
            writeln!(f, "Ops/s   {rate:.2}")?;
        }
        Ok(())
    }
}

/// Outcome of a batched run: one timestamp pair around the whole loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedResult {
    pub label: String,
    pub unit: Unit,
    pub clock: String,
    pub iterations: u64,
    pub total: u64,
    pub average: f64,
    pub throughput_per_s: Option<f64>,
}

impl BatchedResult {
    pub fn new(
        label: &str,
        unit: Unit,
        clock: &str,
        iterations: Iterations,
        total: Sample,
    ) -> Self {
        let n = iterations.get();
        let total = total.get();
        Self {
            label: label.to_string(),
            unit,
            clock: clock.to_string(),
            iterations: n,
            total,
            average: total as f64 / n as f64,
            throughput_per_s: throughput(unit, n, total),
        }
    }
}

impl fmt::Display for BatchedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.suffix();
        writeln!(f, "[{}]", self.label)?;
        match self.unit {
            Unit::Nanoseconds => writeln!(f, "Total   {:.3} ms", self.total as f64 / 1e6)?,
            Unit::Cycles => writeln!(f, "Total   {} {unit}", self.total)?,
        }
        writeln!(f, "Avg     {:.2} {unit}", self.average)?;
        writeln!(f, "Runs    {}", self.iterations)?;
        if let Some(rate) = self.throughput_per_s {
            writeln!(f, "Ops/s   {rate:.2}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate_of(samples: &[u64]) -> Aggregate {
        let mut agg = Aggregate::new();
        for &s in samples {
            agg.record(Sample::between(0, s).unwrap());
        }
        agg
    }

    #[test]
    fn wall_clock_report_layout() {
        let result = BenchmarkResult::from_aggregate(
            "noop",
            Unit::Nanoseconds,
            "test",
            Iterations::new(4).unwrap(),
            aggregate_of(&[10, 20, 30, 40]),
        )
        .unwrap();

        assert_eq!(result.average, 25.0);
        assert_eq!(result.throughput_per_s, Some(4.0 / 100e-9));
        assert_eq!(
            result.to_string(),
            "[noop]\n\
             Avg     25.00 ns\n\
             Min     10 ns\n\
             Max     40 ns\n\
             Runs    4\n\
             Ops/s   40000000.00\n"
        );
    }

    #[test]
    fn cycle_report_has_no_rate() {
        let result = BenchmarkResult::from_aggregate(
            "nop",
            Unit::Cycles,
            "test",
            Iterations::new(2).unwrap(),
            aggregate_of(&[1000, 3001]),
        )
        .unwrap();

        assert_eq!(result.throughput_per_s, None);
        assert_eq!(
            result.to_string(),
            "[nop]\n\
             Avg     2000.50 cycles\n\
             Min     1000 cycles\n\
             Max     3001 cycles\n\
             Runs    2\n"
        );
    }

    #[test]
    fn dropped_samples_are_reported() {
        let mut agg = aggregate_of(&[5, 7]);
        agg.discard(9, 3);
        let result = BenchmarkResult::from_aggregate(
            "flaky",
            Unit::Cycles,
            "test",
            Iterations::new(3).unwrap(),
            agg,
        )
        .unwrap();

        assert_eq!(result.samples, 2);
        assert_eq!(result.discarded, 1);
        assert_eq!(result.average, 6.0);
        assert!(result.to_string().contains("Runs    3\nDropped 1\n"));
    }

    #[test]
    fn all_samples_discarded_is_a_regression() {
        let mut agg = Aggregate::new();
        agg.discard(50, 40);
        let err = BenchmarkResult::from_aggregate(
            "broken",
            Unit::Nanoseconds,
            "test",
            Iterations::new(1).unwrap(),
            agg,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BenchError::ClockRegression { start: 50, end: 40 }
        ));
    }

    #[test]
    fn zero_total_has_no_rate() {
        let result = BenchmarkResult::from_aggregate(
            "coarse",
            Unit::Nanoseconds,
            "test",
            Iterations::new(3).unwrap(),
            aggregate_of(&[0, 0, 0]),
        )
        .unwrap();
        assert_eq!(result.throughput_per_s, None);
        assert_eq!(result.min, 0);
    }

    #[test]
    fn batched_report_layout() {
        let result = BatchedResult::new(
            "loop",
            Unit::Nanoseconds,
            "test",
            Iterations::new(1000).unwrap(),
            Sample::between(0, 2_500_000).unwrap(),
        );
        assert_eq!(result.average, 2500.0);
        assert_eq!(
            result.to_string(),
            "[loop]\n\
             Total   2.500 ms\n\
             Avg     2500.00 ns\n\
             Runs    1000\n\
             Ops/s   400000.00\n"
        );
    }
}
