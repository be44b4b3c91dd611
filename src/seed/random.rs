//! Uniform random seeding.

use crate::error::{ClusterError, Result};
use crate::ingest::WorkingSet;
use crate::sample::sample_at_least;
use crate::seed::Centroid;
use crate::types::CentroidId;
use crate::utils::random::RandomSampler;

/// Select k points uniformly at random as the initial centroids.
///
/// Rows pass an independent Bernoulli filter tuned to yield at least k
/// acceptances, and the first k accepted become centroids with dense
/// ids in arrival order.
pub fn seed(ws: &WorkingSet, k: usize, sampler: &mut RandomSampler) -> Result<Vec<Centroid>> {
    if k == 0 {
        return Err(ClusterError::invalid_input("k must be positive"));
    }
    let n = ws.kept_count();
    if n < k {
        return Err(ClusterError::insufficient_points(format!(
            "{} points remain after filtering but k = {}",
            n, k
        )));
    }

    let rows = sample_at_least(n, k, sampler);
    Ok(rows[..k]
        .iter()
        .enumerate()
        .map(|(i, &row)| Centroid {
            cid: i as CentroidId + 1,
            coords: ws.points[row].coords.clone(),
        })
        .collect())
}
