use std::hint::black_box;
use std::io::{self, Write};

use tracing::{debug, warn};

use crate::aggregate::{Aggregate, Sample};
use crate::clock::{ordering_barrier, Clock};
use crate::config::{Iterations, RegressionPolicy};
use crate::error::BenchError;
use crate::report::{BatchedResult, BenchmarkResult};
use crate::DefaultClock;

/// Measurement engine bound to one clock backend.
///
/// Every call starts from a fresh [`Aggregate`]; nothing is carried over
/// between runs.
#[derive(Debug, Clone)]
pub struct Bench<C: Clock> {
    clock: C,
    policy: RegressionPolicy,
}

impl<C: Clock> Bench<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            policy: RegressionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RegressionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn policy(&self) -> RegressionPolicy {
        self.policy
    }

    /// Time `work` once per iteration and summarize the samples.
    #[inline]
    pub fn measure<T>(
        &self,
        label: &str,
        iterations: u64,
        mut work: impl FnMut() -> T,
    ) -> Result<BenchmarkResult, BenchError> {
        self.try_measure(label, iterations, || Ok::<T, BenchError>(work()))
    }

    /// Like [`Bench::measure`] for fallible work.
    ///
    /// The first error returned by `work` ends the run and is handed back
    /// unchanged; the partial aggregate is dropped.
    pub fn try_measure<T, E, F>(
        &self,
        label: &str,
        iterations: u64,
        mut work: F,
    ) -> Result<BenchmarkResult, E>
    where
        F: FnMut() -> Result<T, E>,
        E: From<BenchError>,
    {
        let iterations = Iterations::new(iterations)?;
        debug!(
            label,
            iterations = iterations.get(),
            clock = self.clock.name(),
            "benchmark start"
        );

        let mut aggregate = Aggregate::new();
        for _ in 0..iterations.get() {
            let start = self.clock.now()?;
            ordering_barrier();
            let out = black_box(work());
            ordering_barrier();
            let end = self.clock.now()?;
            out?;

            match Sample::between(start, end) {
                Ok(sample) => aggregate.record(sample),
                Err(err) => match self.policy {
                    RegressionPolicy::Abort => return Err(err.into()),
                    RegressionPolicy::Discard => aggregate.discard(start, end),
                },
            }
        }

        if aggregate.discarded() > 0 {
            warn!(
                label,
                discarded = aggregate.discarded(),
                clock = self.clock.name(),
                "discarded samples where the clock went backwards"
            );
        }

        let result = BenchmarkResult::from_aggregate(
            label,
            C::UNIT,
            self.clock.name(),
            iterations,
            aggregate,
        )?;
        debug!(label, average = result.average, "benchmark done");
        Ok(result)
    }

    /// Measure, then write the report to stdout.
    pub fn run<T>(
        &self,
        label: &str,
        iterations: u64,
        work: impl FnMut() -> T,
    ) -> Result<BenchmarkResult, BenchError> {
        let result = self.measure(label, iterations, work)?;
        print_report(&result)?;
        Ok(result)
    }

    /// Fallible counterpart of [`Bench::run`].
    pub fn try_run<T, E, F>(
        &self,
        label: &str,
        iterations: u64,
        work: F,
    ) -> Result<BenchmarkResult, E>
    where
        F: FnMut() -> Result<T, E>,
        E: From<BenchError>,
    {
        let result = self.try_measure(label, iterations, work)?;
        print_report(&result).map_err(E::from)?;
        Ok(result)
    }

    /// Time the whole loop with a single pair of reads.
    ///
    /// Per-iteration clock overhead is amortized away, at the cost of
    /// min/max.
    pub fn measure_batched<T>(
        &self,
        label: &str,
        iterations: u64,
        mut work: impl FnMut() -> T,
    ) -> Result<BatchedResult, BenchError> {
        let iterations = Iterations::new(iterations)?;
        debug!(
            label,
            iterations = iterations.get(),
            clock = self.clock.name(),
            "batched benchmark start"
        );

        let start = self.clock.now()?;
        ordering_barrier();
        for _ in 0..iterations.get() {
            black_box(work());
        }
        ordering_barrier();
        let end = self.clock.now()?;

        let total = Sample::between(start, end)?;
        Ok(BatchedResult::new(
            label,
            C::UNIT,
            self.clock.name(),
            iterations,
            total,
        ))
    }
}

fn print_report(result: &impl std::fmt::Display) -> Result<(), BenchError> {
    let mut out = io::stdout().lock();
    writeln!(out, "{result}")?;
    Ok(())
}

/// Run `work` `iterations` times on the build's default clock, print the
/// report to stdout and return the result.
///
/// The default clock is the monotonic wall clock, or the cycle counter when
/// the `cycle-counter` feature is enabled.
pub fn run_benchmark<T>(
    label: &str,
    iterations: u64,
    work: impl FnMut() -> T,
) -> Result<BenchmarkResult, BenchError> {
    // Reject before the clock is probed.
    Iterations::new(iterations)?;
    Bench::new(DefaultClock::new()?).run(label, iterations, work)
}
