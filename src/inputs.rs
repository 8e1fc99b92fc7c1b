//! Deterministic inputs for the built-in workloads.
//!
//! Buffers are produced before a benchmark starts and never inside a timed
//! region. Generation is parallel, but each chunk draws from its own RNG
//! seeded from the master seed and the chunk index, so the output does not
//! depend on thread scheduling. Chunk boundaries are fixed, so a shorter
//! buffer is always a prefix of a longer one with the same seed.

use rand::seq::SliceRandom;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Bytes generated per RNG stream.
const CHUNK_BYTES: usize = 4096;

/// Keys generated per RNG stream.
const CHUNK_KEYS: usize = 1024;

fn chunk_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

/// `len` pseudo-random bytes.
pub fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    buf.par_chunks_mut(CHUNK_BYTES)
        .enumerate()
        .for_each(|(i, chunk)| {
            let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed(seed, i));
            rng.fill_bytes(chunk);
        });
    buf
}

/// `len` pseudo-random `u64` keys (duplicates possible).
pub fn random_keys(seed: u64, len: usize) -> Vec<u64> {
    let mut keys = vec![0u64; len];
    keys.par_chunks_mut(CHUNK_KEYS)
        .enumerate()
        .for_each(|(i, chunk)| {
            let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed(seed, i));
            for k in chunk {
                *k = rng.next_u64();
            }
        });
    keys
}

/// A permutation of `0..len`.
pub fn shuffled_keys(rng: &mut ChaCha8Rng, len: usize) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..len as u64).collect();
    keys.shuffle(rng);
    keys
}
