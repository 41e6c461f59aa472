//! Deterministic random number generation for synthetic rosters.
//!
//! RULE: synthetic data never touches a platform RNG. Every draw comes
//! from a `RosterRng` seeded from the caller's seed and a stable stream
//! index, so the same seed always yields the same workshop.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// One deterministic stream.
pub struct RosterRng {
    inner: Pcg64Mcg,
}

impl RosterRng {
    /// The stream index must never change once assigned.
    pub fn new(seed: u64, stream: RosterStream) -> Self {
        let derived = seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n == 0` yields 0.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Uniform integer in [lo, hi].
    pub fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        lo + self.below(u64::from(hi - lo) + 1) as u32
    }

    /// Uniform float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.below(items.len() as u64) as usize)
    }
}

/// Stable stream assignments. Append only; reordering changes every seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RosterStream {
    Names = 0,
    Elves = 1,
    Stations = 2,
    Orders = 3,
}
