//! k-means++ weighted seeding.
//!
//! Each successive centroid is drawn with probability proportional to
//! the squared distance to the nearest already-chosen centroid. The
//! draw is deterministic given the random stream: candidates are
//! walked in pid order and the first whose cumulative weight reaches
//! the drawn threshold wins, so zero-distance duplicates resolve to
//! the lower pid.

use crate::error::{ClusterError, Result};
use crate::ingest::WorkingSet;
use crate::metric::Metric;
use crate::sample::sample_at_least;
use crate::seed::Centroid;
use crate::types::{CentroidId, PointId};
use crate::utils::random::RandomSampler;
use crate::vector::SparseVector;

/// Run k-means++ seeding over the working set.
///
/// With an explicit `sample_frac` in (0, 1] the pool is first reduced
/// to a Bernoulli sample of `floor(n * frac)` points, and a target
/// below k is an error. Without one, the default target is
/// `floor(n / 100)`; when that undershoots k the full point set is
/// used instead.
pub fn seed(
    ws: &WorkingSet,
    k: usize,
    sample_frac: Option<f64>,
    metric: Metric,
    sampler: &mut RandomSampler,
) -> Result<Vec<Centroid>> {
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

    let pool = candidate_pool(ws, k, n, sample_frac, sampler)?;

    // (pid, coords) in pid order; the cumulative-weight draw depends
    // on this ordering.
    let mut candidates: Vec<(PointId, &SparseVector)> = pool
        .iter()
        .map(|&row| (ws.points[row].pid, &ws.points[row].coords))
        .collect();
    candidates.sort_by_key(|&(pid, _)| pid);

    let m = candidates.len();
    let mut centroids: Vec<Centroid> = Vec::with_capacity(k);

    let first = sampler.uniform_index(m);
    centroids.push(Centroid {
        cid: 1,
        coords: candidates[first].1.clone(),
    });

    // Computed from scratch after the first insertion, then maintained
    // as min(prev, dist to the newest centroid).
    let mut min_distance: Vec<f64> = candidates
        .iter()
        .map(|&(_, coords)| metric.distance_unchecked(coords, &centroids[0].coords))
        .collect();

    while centroids.len() < k {
        let total_weight: f64 = min_distance.iter().map(|&d| d * d).sum();
        let r = total_weight * sampler.uniform();

        let mut cumulative = 0.0f64;
        let mut selected = m - 1;
        for (i, &d) in min_distance.iter().enumerate() {
            cumulative += d * d;
            if cumulative >= r {
                selected = i;
                break;
            }
        }

        let next = Centroid {
            cid: centroids.len() as CentroidId + 1,
            coords: candidates[selected].1.clone(),
        };
        for (i, d) in min_distance.iter_mut().enumerate() {
            let dist = metric.distance_unchecked(candidates[i].1, &next.coords);
            if dist < *d {
                *d = dist;
            }
        }
        centroids.push(next);
    }

    Ok(centroids)
}

/// Resolve the candidate row pool, applying the optional sub-sample.
fn candidate_pool(
    ws: &WorkingSet,
    k: usize,
    n: usize,
    sample_frac: Option<f64>,
    sampler: &mut RandomSampler,
) -> Result<Vec<usize>> {
    match sample_frac {
        Some(frac) => {
            if !(frac > 0.0 && frac <= 1.0) {
                return Err(ClusterError::invalid_input(format!(
                    "sample_frac must be in (0, 1], got {}",
                    frac
                )));
            }
            let target = (n as f64 * frac).floor() as usize;
            if target < k {
                return Err(ClusterError::sample_too_small(format!(
                    "sample_frac {} of {} points yields {} candidates but k = {}",
                    frac, n, target, k
                )));
            }
            let mut rows = sample_at_least(n, target, sampler);
            rows.truncate(target);
            Ok(rows)
        }
        None => {
            let target = n / 100;
            if target < k {
                return Ok((0..n).collect());
            }
            let mut rows = sample_at_least(n, target, sampler);
            rows.truncate(target);
            Ok(rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceRow;
    use crate::ingest::build_working_set;

    fn working_set_1d(values: &[f64]) -> WorkingSet {
        let rows = values
            .iter()
            .map(|&v| SourceRow::anonymous(SparseVector::from_dense(&[v])))
            .collect();
        build_working_set(rows).unwrap()
    }

    #[test]
    fn test_weighting_forces_far_point() {
        // Four coincident points at 0 and one at 100: whatever the
        // first pick, the distance-squared weighting makes the chosen
        // pair {0, 100}.
        let ws = working_set_1d(&[0.0, 0.0, 0.0, 0.0, 100.0]);
        for seed_val in 0..25 {
            let mut sampler = RandomSampler::with_seed(seed_val);
            let centroids = seed(&ws, 2, None, Metric::L2Norm, &mut sampler).unwrap();
            let mut positions: Vec<f64> = centroids.iter().map(|c| c.coords.get(0)).collect();
            positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(positions, vec![0.0, 100.0], "seed {}", seed_val);
        }
    }

    #[test]
    fn test_dense_ids_in_insertion_order() {
        let ws = working_set_1d(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut sampler = RandomSampler::with_seed(11);
        let centroids = seed(&ws, 3, None, Metric::L2Norm, &mut sampler).unwrap();
        let cids: Vec<_> = centroids.iter().map(|c| c.cid).collect();
        assert_eq!(cids, vec![1, 2, 3]);
    }

    #[test]
    fn test_explicit_frac_too_small() {
        let ws = working_set_1d(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let mut sampler = RandomSampler::with_seed(1);
        // floor(10 * 0.2) = 2 < k = 3
        let err = seed(&ws, 3, Some(0.2), Metric::L2Norm, &mut sampler).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::SampleTooSmall);
    }

    #[test]
    fn test_explicit_frac_out_of_range() {
        let ws = working_set_1d(&[0.0, 1.0, 2.0]);
        let mut sampler = RandomSampler::with_seed(1);
        assert!(seed(&ws, 2, Some(0.0), Metric::L2Norm, &mut sampler).is_err());
        assert!(seed(&ws, 2, Some(1.5), Metric::L2Norm, &mut sampler).is_err());
    }

    #[test]
    fn test_default_target_falls_back_to_full_set() {
        // n = 6 gives a default target of 0; the full set is used and
        // seeding still succeeds.
        let ws = working_set_1d(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let mut sampler = RandomSampler::with_seed(3);
        let centroids = seed(&ws, 2, None, Metric::L2Norm, &mut sampler).unwrap();
        assert_eq!(centroids.len(), 2);
    }

    #[test]
    fn test_insufficient_points() {
        let ws = working_set_1d(&[0.0, 1.0]);
        let mut sampler = RandomSampler::with_seed(1);
        let err = seed(&ws, 3, None, Metric::L2Norm, &mut sampler).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientPoints);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let values: Vec<f64> = (0..300).map(|i| (i % 17) as f64).collect();
        let ws = working_set_1d(&values);
        let a = seed(&ws, 4, None, Metric::L2Norm, &mut RandomSampler::with_seed(99)).unwrap();
        let b = seed(&ws, 4, None, Metric::L2Norm, &mut RandomSampler::with_seed(99)).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.coords, y.coords);
        }
    }
}
