//! Deterministic RNG helpers.
//!
//! The logistics tick loop itself is fully deterministic; randomness appears
//! in exactly two places, both reproducible from the config seed:
//!
//! - staggering route-retry offsets so unconfigured endpoints do not all
//!   re-evaluate on the same tick ([`stagger`], a pure mixing function), and
//! - generating demo/test worlds ([`SimRng`]).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing — spreads
/// consecutive salts uniformly across the output space.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic per-salt offset in `0..modulus`.
///
/// Pure function of `(global_seed, salt)`: inserting or removing other
/// endpoints never disturbs an existing endpoint's retry phase.
#[inline]
pub fn stagger(global_seed: u64, salt: u32, modulus: u64) -> u64 {
    debug_assert!(modulus > 0);
    (global_seed ^ (salt as u64).wrapping_mul(MIXING_CONSTANT)) % modulus
}

/// Simulation-level deterministic RNG, seeded once from the config seed.
///
/// Used by world generators and demos; the core tick loop never touches it.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Bernoulli draw with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
