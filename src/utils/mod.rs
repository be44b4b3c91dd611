//! Utility functions and types for the clustering engine.

pub mod parallel;
pub mod random;

pub use parallel::{maybe_parallel_map, maybe_parallel_map_threshold, MIN_PARALLEL_SIZE};
pub use random::RandomSampler;
