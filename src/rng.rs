//! Randomness sources for outcome generation
//!
//! Every generator draws from an injected [`RandomSource`] instead of a global
//! RNG, so rounds can be replayed from a seed or from a fairness proof.

use rand::{rngs::StdRng, Rng as _, SeedableRng};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

/// Uniform source of floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Uniform float in `[low, low + width)`.
    fn next_in(&mut self, low: f64, width: f64) -> f64 {
        low + self.next_f64() * width
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// `rand`-backed source, either OS-seeded or seeded for replay
pub struct StdRandom {
    inner: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: VecDeque<f64> = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            None => 0.0,
        }
    }
}

/// Deterministic stream derived from a 32-byte seed (a VRF output).
///
/// Block `n` is `SHA-256(seed || n_be)`; each 4-byte chunk maps to `u32 / 2^32`.
#[derive(Debug, Clone)]
pub struct HashChainRandom {
    seed: [u8; 32],
    counter: u64,
    block: [u8; 32],
    offset: usize,
}

impl HashChainRandom {
    pub fn new(seed: [u8; 32]) -> Self {
        let mut rng = Self {
            seed,
            counter: 0,
            block: [0u8; 32],
            offset: 32,
        };
        rng.refill();
        rng
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.block.copy_from_slice(&hasher.finalize());
        self.counter += 1;
        self.offset = 0;
    }
}

impl RandomSource for HashChainRandom {
    fn next_f64(&mut self) -> f64 {
        if self.offset + 4 > self.block.len() {
            self.refill();
        }
        let chunk = &self.block[self.offset..self.offset + 4];
        let v = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        self.offset += 4;
        (v as f64) / (u32::MAX as f64 + 1.0)
    }
}

/// Chooses `count` distinct indices from `0..len` with a partial Fisher-Yates
/// shuffle. Always returns exactly `count.min(len)` positions.
pub fn sample_distinct(rng: &mut dyn RandomSource, len: usize, count: usize) -> Vec<usize> {
    let count = count.min(len);
    let mut pool: Vec<usize> = (0..len).collect();
    for i in 0..count {
        let j = i + rng.next_index(len - i);
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}

/// Full Fisher-Yates shuffle in place.
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
