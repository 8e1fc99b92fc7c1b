use crate::clock::Clock;
use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::harness::Bench;
use crate::inputs;
use crate::report::BenchmarkResult;

const SIZES: [usize; 2] = [1_024, 16_384];

/// Sort a fresh copy of a seeded input each iteration. The copy is part of
/// the measured work.
pub fn run<C: Clock>(
    cfg: &BenchConfig,
    bench: &Bench<C>,
) -> Result<Vec<BenchmarkResult>, BenchError> {
    let mut rng = cfg.rng();
    let mut out = Vec::new();

    for size in SIZES {
        let permutation = inputs::shuffled_keys(&mut rng, size);
        let random = inputs::random_keys(cfg.seed, size);

        out.push(bench.measure(&format!("sort.unstable.permutation.{size}"), cfg.iters(), || {
            let mut keys = permutation.clone();
            keys.sort_unstable();
            keys
        })?);
        out.push(bench.measure(&format!("sort.stable.random.{size}"), cfg.iters(), || {
            let mut keys = random.clone();
            keys.sort();
            keys
        })?);
    }
    Ok(out)
}
