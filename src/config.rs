use std::num::NonZeroU64;

use clap::ValueEnum;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::BenchError;

/// A validated, strictly positive iteration count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iterations(NonZeroU64);

impl Iterations {
    pub fn new(iterations: u64) -> Result<Self, BenchError> {
        NonZeroU64::new(iterations)
            .map(Self)
            .ok_or(BenchError::InvalidIterations { iterations })
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for Iterations {
    type Error = BenchError;

    fn try_from(iterations: u64) -> Result<Self, Self::Error> {
        Self::new(iterations)
    }
}

/// What to do with a sample whose end timestamp precedes its start.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum RegressionPolicy {
    /// Drop the sample, count it, and keep going.
    #[default]
    Discard,
    /// Stop the benchmark with `BenchError::ClockRegression`.
    Abort,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

/// Settings shared by the built-in suites.
#[derive(Clone, Debug, Default)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
    pub policy: RegressionPolicy,
}

impl BenchConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    pub fn iters(&self) -> u64 {
        match self.profile {
            Profile::Quick => 300,
            Profile::Full => 3_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iterations_rejected() {
        let err = Iterations::new(0).unwrap_err();
        assert!(matches!(err, BenchError::InvalidIterations { iterations: 0 }));
        assert!(Iterations::try_from(0).is_err());
    }

    #[test]
    fn positive_iterations_accepted() {
        assert_eq!(Iterations::new(1).unwrap().get(), 1);
        assert_eq!(Iterations::try_from(u64::MAX).unwrap().get(), u64::MAX);
    }

    #[test]
    fn full_profile_runs_longer() {
        let quick = BenchConfig::default();
        let full = BenchConfig {
            profile: Profile::Full,
            ..Default::default()
        };
        assert!(full.iters() > quick.iters());
        assert_eq!(quick.profile.as_str(), "quick");
    }
}
