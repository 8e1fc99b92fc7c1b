use crate::clock::Timestamp;
use crate::error::BenchError;

/// Elapsed clock units for a single iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sample(u64);

impl Sample {
    /// Difference between two readings of the same clock.
    ///
    /// An end reading before the start reading is a clock regression and is
    /// never wrapped or negated.
    #[inline(always)]
    pub fn between(start: Timestamp, end: Timestamp) -> Result<Self, BenchError> {
        match end.checked_sub(start) {
            Some(elapsed) => Ok(Sample(elapsed)),
            None => Err(BenchError::ClockRegression { start, end }),
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Running min/max/total over the samples of one benchmark run.
///
/// Individual samples are not retained, so memory use is constant in the
/// iteration count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregate {
    min: u64,
    max: u64,
    total: u64,
    count: u64,
    discarded: u64,
    last_regression: Option<(Timestamp, Timestamp)>,
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregate {
    pub fn new() -> Self {
        Self {
            min: u64::MAX,
            max: 0,
            total: 0,
            count: 0,
            discarded: 0,
            last_regression: None,
        }
    }

    #[inline(always)]
    pub fn record(&mut self, sample: Sample) {
        let s = sample.0;
        self.min = self.min.min(s);
        self.max = self.max.max(s);
        self.total = self.total.saturating_add(s);
        self.count += 1;
    }

    /// Count a regressed sample without folding it into the statistics.
    pub fn discard(&mut self, start: Timestamp, end: Timestamp) {
        self.discarded += 1;
        self.last_regression = Some((start, end));
    }

    pub fn min(&self) -> Option<u64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<u64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of samples folded in.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total as f64 / self.count as f64)
    }

    pub fn last_regression(&self) -> Option<(Timestamp, Timestamp)> {
        self.last_regression
    }
}
