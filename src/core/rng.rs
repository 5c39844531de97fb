//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. The simulation step draws the
//! radar error targets from it, so every participant walks the same
//! error vectors.

use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_ONE};
use super::vec3::FixedVec3;

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use synced_read::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random Fixed in range [0, max).
    #[inline]
    pub fn next_fixed(&mut self, max: Fixed) -> Fixed {
        if max <= 0 {
            return 0;
        }
        let raw = (self.next_u64() >> 32) as i128;
        ((raw * max as i128) >> 32) as Fixed
    }

    /// Generate a random Fixed in range [min, max).
    #[inline]
    pub fn next_fixed_range(&mut self, min: Fixed, max: Fixed) -> Fixed {
        if min >= max {
            return min;
        }
        min.wrapping_add(self.next_fixed(max.wrapping_sub(min)))
    }

    /// Random vector inside the unit sphere, rejecting the origin.
    pub fn next_vector(&mut self) -> FixedVec3 {
        loop {
            let v = FixedVec3::new(
                self.next_fixed_range(-FIXED_ONE, FIXED_ONE),
                self.next_fixed_range(-FIXED_ONE, FIXED_ONE),
                self.next_fixed_range(-FIXED_ONE, FIXED_ONE),
            );
            let len_sq = v.length_squared();
            if len_sq > 0 && len_sq <= FIXED_ONE {
                return v;
            }
        }
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_next_fixed_range() {
        let mut rng = DeterministicRng::new(9999);
        for _ in 0..1000 {
            let val = rng.next_fixed_range(-FIXED_ONE, FIXED_ONE);
            assert!((-FIXED_ONE..FIXED_ONE).contains(&val));
        }
        assert_eq!(rng.next_fixed_range(5, 5), 5);
    }

    #[test]
    fn test_next_vector_in_unit_sphere() {
        let mut rng = DeterministicRng::new(7);
        for _ in 0..200 {
            let v = rng.next_vector();
            assert!(v.length_squared() <= FIXED_ONE);
            assert!(v.length_squared() > 0);
        }
    }
}
