//! Random sampling utilities.

use rand::prelude::*;
use rand::seq::SliceRandom;

/// Seedable random source for a clustering run.
///
/// Wraps a `StdRng` and provides the two primitives the engine needs:
/// unique index draws and a per-row uniform(0,1).
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Create a new sampler with a random seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a new sampler with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample k unique indices from [0, n).
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        if k >= n {
            return (0..n).collect();
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.partial_shuffle(&mut self.rng, k);
        indices.truncate(k);
        indices
    }

    /// A uniform double in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen()
    }

    /// A uniform index in [0, n).
    pub fn uniform_index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}
