//! Parallel execution helpers.
//!
//! Phases of the engine are expressed as pure maps over the working
//! set; these helpers run them through rayon once the input is large
//! enough to pay for the fan-out.

use rayon::prelude::*;

/// Minimum number of items before parallelization is beneficial.
pub const MIN_PARALLEL_SIZE: usize = 1024;

/// Execute a map operation, choosing parallel or sequential based on
/// size. Uses parallel execution only when the number of items exceeds
/// [`MIN_PARALLEL_SIZE`].
#[inline]
pub fn maybe_parallel_map<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    maybe_parallel_map_threshold(items, MIN_PARALLEL_SIZE, f)
}

/// Execute a map operation with a custom threshold.
#[inline]
pub fn maybe_parallel_map_threshold<T, U, F>(items: &[T], threshold: usize, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if items.len() >= threshold {
        items.par_iter().map(&f).collect()
    } else {
        items.iter().map(f).collect()
    }
}
