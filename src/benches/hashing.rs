use sha2::{Digest, Sha256};

use crate::clock::Clock;
use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::harness::Bench;
use crate::inputs;
use crate::report::BenchmarkResult;

const SIZES: [usize; 3] = [64, 1024, 64 * 1024];

/// SHA-256 over seeded buffers of increasing size.
pub fn run<C: Clock>(
    cfg: &BenchConfig,
    bench: &Bench<C>,
) -> Result<Vec<BenchmarkResult>, BenchError> {
    let buffers: Vec<(usize, Vec<u8>)> = SIZES
        .iter()
        .map(|&size| (size, inputs::random_bytes(cfg.seed, size)))
        .collect();

    let mut out = Vec::with_capacity(buffers.len());
    for (size, buf) in &buffers {
        let label = format!("hash.sha256.{size}");
        out.push(bench.measure(&label, cfg.iters(), || Sha256::digest(buf))?);
    }
    Ok(out)
}
