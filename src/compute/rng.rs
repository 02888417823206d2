//! Seedable random source threaded through the optimizers.

use rand::prelude::*;

use crate::schema::{Bounds, DIMENSIONS, Interval, ParameterVector};

/// Random number generator wrapper for parameter-space operations.
///
/// Each optimizer run owns one; nothing draws from global state.
#[derive(Debug, Clone)]
pub struct ParamRng {
    rng: StdRng,
}

impl ParamRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded if `seed` is given, entropy-seeded otherwise.
    pub fn from_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::random, Self::new)
    }

    /// Uniform draw from a closed interval.
    pub fn uniform(&mut self, interval: &Interval) -> f64 {
        self.rng.gen_range(interval.min..=interval.max)
    }

    /// Vector with every dimension drawn independently and uniformly from its bounds.
    pub fn random_vector(&mut self, bounds: &Bounds) -> ParameterVector {
        let mut params = ParameterVector::default();
        for i in 0..DIMENSIONS {
            params[i] = self.uniform(bounds.dimension(i));
        }
        params
    }

    /// Index in `[0, n)`.
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.r#gen::<f64>() < p
    }

    /// Crossover point in `{1, .., DIMENSIONS - 1}`.
    pub fn crossover_point(&mut self) -> usize {
        self.rng.gen_range(1..DIMENSIONS)
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}
