//! Model evaluation: total within-cluster cost and the simplified
//! silhouette coefficient.

use crate::ingest::WorkingSet;
use crate::metric::Metric;
use crate::seed::Centroid;
use crate::utils::parallel::maybe_parallel_map;

/// Quality measures for a finished clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Sum over all points of the distance to the assigned centroid.
    pub cost: f64,
    /// Mean of `(b - a) / max(a, b)` where `a` is the distance to the
    /// own centroid and `b` the distance to the nearest other one.
    pub silhouette: f64,
}

/// Evaluate a clustered working set against its final centroids.
///
/// Points contribute 0 to the silhouette when `max(a, b)` is zero;
/// with a single centroid there is no "nearest other" and the
/// silhouette is reported as 0.
pub fn evaluate_model(ws: &WorkingSet, centroids: &[Centroid], metric: Metric) -> Evaluation {
    let single_centroid = centroids.len() < 2;

    let per_point: Vec<(f64, f64)> = maybe_parallel_map(&ws.points, |point| {
        let own = &centroids[point.cid as usize - 1];
        let a = metric.distance_unchecked(&point.coords, &own.coords);

        if single_centroid {
            return (a, 0.0);
        }

        let b = centroids
            .iter()
            .filter(|c| c.cid != point.cid)
            .map(|c| metric.distance_unchecked(&point.coords, &c.coords))
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        let contribution = if denom == 0.0 { 0.0 } else { (b - a) / denom };
        (a, contribution)
    });

    let cost = per_point.iter().map(|&(a, _)| a).sum();
    let silhouette =
        per_point.iter().map(|&(_, s)| s).sum::<f64>() / ws.kept_count() as f64;

    Evaluation { cost, silhouette }
}
