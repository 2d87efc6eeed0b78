//! Splittable pseudorandom streams for the parallel search.
//!
//! Each worker owns one `SplitMix` stream. Streams are derived from a single
//! root generator with [`SplitMix::split`], always in ascending worker order,
//! so that a run is reproducible from its process seed alone.

use rand::{RngCore, SeedableRng};
use wrapping_arithmetic::wrappit;

/// Default stream increment: the odd integer closest to 2^64 / phi.
pub const GOLDEN_GAMMA: u64 = 0x9e3779b97f4a7c15;

/// SplitMix64 generator with an explicit, always odd, stream increment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SplitMix {
    /// Weyl sequence position.
    state: u64,
    /// Stream increment. Odd for every instance.
    gamma: u64,
}

/// Output mixing function of SplitMix64.
#[wrappit]
#[inline]
pub fn mix64(z: u64) -> u64 {
    let z = (z ^ (z >> 30)) * 0xbf58476d1ce4e5b9;
    let z = (z ^ (z >> 27)) * 0x94d049bb133111eb;
    z ^ (z >> 31)
}

impl SplitMix {
    /// Creates the root stream for a process seed.
    pub fn new(seed: u64) -> Self {
        SplitMix {
            state: seed,
            gamma: GOLDEN_GAMMA,
        }
    }

    /// Generates the next 64-bit output.
    #[wrappit]
    #[inline]
    pub fn next(&mut self) -> u64 {
        self.state += self.gamma;
        mix64(self.state)
    }

    /// Derives an independent child stream. Consumes exactly two outputs of `self`.
    pub fn split(&mut self) -> SplitMix {
        let state = self.next();
        let gamma = self.next() | 1;
        SplitMix { state, gamma }
    }

    /// Derives `count` child streams, the first child first.
    pub fn streams(&mut self, count: usize) -> Vec<SplitMix> {
        (0..count).map(|_| self.split()).collect()
    }

    /// Current Weyl sequence position.
    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Stream increment.
    #[inline]
    pub fn gamma(&self) -> u64 {
        self.gamma
    }
}

impl RngCore for SplitMix {
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let bytes = dest.len();
        let mut i = 0;
        while i < bytes {
            let x = self.next();
            let j = bytes.min(i + 8);
            // Always use Little-Endian.
            dest[i..j].copy_from_slice(&x.to_le_bytes()[0..(j - i)]);
            i = j;
        }
    }
}

impl SeedableRng for SplitMix {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        SplitMix::new(u64::from_le_bytes(seed))
    }

    /// The seed is used as the initial state as is, without expansion.
    fn seed_from_u64(state: u64) -> Self {
        SplitMix::new(state)
    }
}
