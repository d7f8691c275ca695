//! Keyed randomness for `random()`.
//!
//! The engine never draws entropy itself. A [RandomSource] maps a caching key to a value in
//! `[0, 1)`, and identical keys must give identical values, so matching the same text twice
//! resolves to the same result.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait RandomSource: Send + Sync {
    /// A value in `[0, 1)` for `key`.
    fn value(&self, key: &str) -> f64;
}

/// The default source: a ChaCha8 stream seeded from the configured seed and the key.
///
/// Both the key hash (64-bit FNV-1a) and the generator are fixed algorithms, so a seed gives
/// the same values on every platform and toolchain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashedRandom {
    seed: u64,
}

impl HashedRandom {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl RandomSource for HashedRandom {
    fn value(&self, key: &str) -> f64 {
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&self.seed.to_le_bytes());
        seed[8..16].copy_from_slice(&key_hash(key).to_le_bytes());
        ChaCha8Rng::from_seed(seed).gen::<f64>()
    }
}

fn key_hash(key: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    key.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Always returns the same value; handy for tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn value(&self, _key: &str) -> f64 {
        self.0
    }
}
