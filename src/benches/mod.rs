//! Built-in workload suites run by the `microbench` binary.
//!
//! Every suite runs its benchmarks one after another on the caller's
//! [`Bench`](crate::Bench); inputs are built before the first one starts.

pub mod hashing;
pub mod sorting;
