//! Row sampling utilities.
//!
//! The seeders need "at least s rows out of n" using independent
//! per-row coin flips, without assuming the substrate can count
//! first. The acceptance probability below is the Chernoff-derived
//! lower bound making a shortfall vanishingly unlikely; callers cap
//! the accepted rows at s afterwards.

use crate::utils::random::RandomSampler;

/// Acceptance probability such that a Bernoulli filter over `n` rows
/// yields at least `s` rows with probability >= 1 - 1e-6.
///
/// `p(s, n) = (s + 14 + sqrt(196 + 28 s)) / n`, clamped to 1.
pub fn row_probability_bound(s: usize, n: usize) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let s = s as f64;
    let p = (s + 14.0 + (196.0 + 28.0 * s).sqrt()) / n as f64;
    p.min(1.0)
}

/// Run independent per-row coin flips with acceptance probability `p`
/// over rows `0..n`, returning accepted row indices in row order.
pub fn bernoulli_rows(n: usize, p: f64, sampler: &mut RandomSampler) -> Vec<usize> {
    (0..n).filter(|_| sampler.uniform() < p).collect()
}

/// Coin-flip attempts before degrading to an exact draw.
const MAX_DRAW_ATTEMPTS: usize = 8;

/// Draw at least `s` of the rows `0..n` by Bernoulli filtering at
/// [`row_probability_bound`], in row order.
///
/// The bound leaves a <= 1e-6 chance of a shortfall per attempt; the
/// flips are retried a few times and then replaced by an exact uniform
/// draw, so the operation is total. Requires `s <= n`.
pub fn sample_at_least(n: usize, s: usize, sampler: &mut RandomSampler) -> Vec<usize> {
    debug_assert!(s <= n);
    let p = row_probability_bound(s, n);
    for _ in 0..MAX_DRAW_ATTEMPTS {
        let rows = bernoulli_rows(n, p, sampler);
        if rows.len() >= s {
            return rows;
        }
    }
    let mut rows = sampler.sample_indices(n, s);
    rows.sort_unstable();
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_formula() {
        // p(10, 1000) = (10 + 14 + sqrt(196 + 280)) / 1000
        let expected = (10.0 + 14.0 + (476.0f64).sqrt()) / 1000.0;
        assert!((row_probability_bound(10, 1000) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bound_clamps_to_one() {
        assert_eq!(row_probability_bound(10, 5), 1.0);
        assert_eq!(row_probability_bound(0, 0), 1.0);
    }

    #[test]
    fn test_bound_decreases_with_n() {
        let small_n = row_probability_bound(50, 1_000);
        let large_n = row_probability_bound(50, 100_000);
        assert!(large_n < small_n);
    }

    #[test]
    fn test_bernoulli_rows_yield_enough() {
        // The bound promises >= s rows with overwhelming probability;
        // with a fixed seed this is deterministic.
        let mut sampler = RandomSampler::with_seed(42);
        let n = 10_000;
        let s = 25;
        let p = row_probability_bound(s, n);
        let rows = bernoulli_rows(n, p, &mut sampler);
        assert!(rows.len() >= s);
        // Accepted rows come back in row order.
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bernoulli_rows_full_acceptance() {
        let mut sampler = RandomSampler::with_seed(1);
        let rows = bernoulli_rows(100, 1.0, &mut sampler);
        assert_eq!(rows.len(), 100);
    }

    #[test]
    fn test_sample_at_least_always_enough() {
        for seed in 0..20 {
            let mut sampler = RandomSampler::with_seed(seed);
            let rows = sample_at_least(500, 30, &mut sampler);
            assert!(rows.len() >= 30);
            assert!(rows.windows(2).all(|w| w[0] < w[1]));
            assert!(rows.iter().all(|&r| r < 500));
        }
    }

    #[test]
    fn test_sample_at_least_whole_range() {
        let mut sampler = RandomSampler::with_seed(3);
        let rows = sample_at_least(10, 10, &mut sampler);
        assert_eq!(rows, (0..10).collect::<Vec<_>>());
    }
}
