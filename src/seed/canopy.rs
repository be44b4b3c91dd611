//! Canopy-based seeding and pre-partitioning.
//!
//! Canopies are threshold-defined neighbourhoods that double as the
//! initial centroids and as a per-point candidate set that bounds the
//! assignment search in the iteration engine.

use ordered_float::OrderedFloat;

use crate::error::{ClusterError, Result};
use crate::ingest::{Point, WorkingSet};
use crate::metric::Metric;
use crate::seed::Centroid;
use crate::types::CentroidId;
use crate::utils::parallel::{maybe_parallel_map, maybe_parallel_map_threshold};
use crate::utils::random::RandomSampler;

/// Points drawn for pairwise threshold estimation.
const ESTIMATION_SAMPLE: usize = 1000;

/// Equi-count buckets for the sorted distance list.
const NTILE_BUCKETS: usize = 10;

/// Shard size for the per-partition greedy pass.
const SHARD_SIZE: usize = 4096;

/// The canopy thresholds. `t1` is the loose (outer) threshold, `t2`
/// the tight (inner) one; `t1 > t2 > 0` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyThresholds {
    /// Loose threshold.
    pub t1: f64,
    /// Tight threshold; canopy centres are at least this far apart.
    pub t2: f64,
}

impl CanopyThresholds {
    /// Membership threshold for assigning points to canopies.
    ///
    /// The factor of 2 compensates for the global dedup: by the
    /// triangle inequality a point's nearest surviving centre is at
    /// most `2 * t2` away.
    pub fn assignment_threshold(&self) -> f64 {
        self.t1.max(2.0 * self.t2)
    }
}

/// Resolve the canopy thresholds, estimating whichever the caller did
/// not supply.
pub fn resolve_thresholds(
    ws: &WorkingSet,
    t1: Option<f64>,
    t2: Option<f64>,
    metric: Metric,
    sampler: &mut RandomSampler,
) -> Result<CanopyThresholds> {
    for (name, value) in [("t1", t1), ("t2", t2)] {
        if let Some(v) = value {
            if v <= 0.0 {
                return Err(ClusterError::invalid_threshold(format!(
                    "{} must be positive, got {}",
                    name, v
                )));
            }
        }
    }

    let both_provided = t1.is_some() && t2.is_some();
    let (t1, t2) = if both_provided {
        (t1.unwrap_or_default(), t2.unwrap_or_default())
    } else {
        let (est1, est2) = estimate_thresholds(ws, metric, sampler)?;
        (t1.unwrap_or(est1), t2.unwrap_or(est2))
    };

    if t1 <= t2 {
        // Caller-supplied pairs are malformed input; a degenerate
        // estimate means the sample could not produce thresholds.
        return if both_provided {
            Err(ClusterError::invalid_threshold(format!(
                "t1 ({}) must exceed t2 ({})",
                t1, t2
            )))
        } else {
            Err(ClusterError::threshold_unavailable(format!(
                "estimated thresholds t1 = {}, t2 = {} are degenerate",
                t1, t2
            )))
        };
    }

    Ok(CanopyThresholds { t1, t2 })
}

/// Estimate (t1, t2) from the pairwise distances of a uniform sample:
/// bucket the sorted distance list into ten equi-count buckets and
/// take t1 = min(bucket 10), t2 = max(bucket 1).
fn estimate_thresholds(
    ws: &WorkingSet,
    metric: Metric,
    sampler: &mut RandomSampler,
) -> Result<(f64, f64)> {
    let n = ws.kept_count();
    let sample = sampler.sample_indices(n, ESTIMATION_SAMPLE);

    let mut distances = Vec::with_capacity(sample.len() * (sample.len().saturating_sub(1)) / 2);
    for (i, &a) in sample.iter().enumerate() {
        for &b in &sample[i + 1..] {
            distances.push(
                metric.distance_unchecked(&ws.points[a].coords, &ws.points[b].coords),
            );
        }
    }
    distances.sort_by_key(|&d| OrderedFloat(d));

    let count = distances.len();
    let base = count / NTILE_BUCKETS;
    if base == 0 {
        return Err(ClusterError::threshold_unavailable(format!(
            "{} pairwise distances are too few to bucket",
            count
        )));
    }

    // SQL ntile semantics: the first (count % 10) buckets take one
    // extra element; bucket 10 never does.
    let remainder = count % NTILE_BUCKETS;
    let bucket1_len = base + usize::from(remainder >= 1);
    let t2 = distances[bucket1_len - 1];
    let t1 = distances[count - base];

    if t1 <= 0.0 {
        return Err(ClusterError::threshold_unavailable(
            "pairwise sample distances are all zero",
        ));
    }

    Ok((t1, t2))
}

/// Build canopies over the working set: greedy per-shard canopy
/// centres, global dedup, then per-point membership sets.
///
/// Returns the surviving centres as initial centroids (dense ids in
/// survival order) and stores each point's candidate set in its
/// `canopies` field.
pub fn seed(
    ws: &mut WorkingSet,
    t1: Option<f64>,
    t2: Option<f64>,
    metric: Metric,
    sampler: &mut RandomSampler,
) -> Result<Vec<Centroid>> {
    let thresholds = resolve_thresholds(ws, t1, t2, metric, sampler)?;

    // Per-partition greedy pass: within a shard, a point within t2 of
    // an existing centre is absorbed, otherwise it founds a new one.
    let chunks: Vec<(usize, &[Point])> = ws
        .points
        .chunks(SHARD_SIZE)
        .enumerate()
        .map(|(ci, chunk)| (ci * SHARD_SIZE, chunk))
        .collect();

    let per_shard: Vec<Vec<usize>> = maybe_parallel_map_threshold(&chunks, 2, |&(start, chunk)| {
        let mut centres: Vec<usize> = Vec::new();
        for (offset, point) in chunk.iter().enumerate() {
            let absorbed = centres.iter().any(|&c| {
                metric.distance_unchecked(&ws.points[c].coords, &point.coords) <= thresholds.t2
            });
            if !absorbed {
                centres.push(start + offset);
            }
        }
        centres
    });

    // Global dedup: discard any centre within t2 of a lower-indexed
    // survivor.
    let mut kept: Vec<usize> = Vec::new();
    for candidate in per_shard.into_iter().flatten() {
        let duplicate = kept.iter().any(|&c| {
            metric.distance_unchecked(&ws.points[c].coords, &ws.points[candidate].coords)
                <= thresholds.t2
        });
        if !duplicate {
            kept.push(candidate);
        }
    }

    let centroids: Vec<Centroid> = kept
        .iter()
        .enumerate()
        .map(|(i, &row)| Centroid {
            cid: i as CentroidId + 1,
            coords: ws.points[row].coords.clone(),
        })
        .collect();

    // Membership pass: a point belongs to every canopy within the
    // assignment threshold. The dedup guarantees a non-empty set up to
    // rounding; the nearest centre backstops the boundary cases.
    let threshold = thresholds.assignment_threshold();
    let memberships: Vec<Vec<CentroidId>> = maybe_parallel_map(&ws.points, |point| {
        let mut members = Vec::new();
        let mut nearest = 0usize;
        let mut nearest_dist = f64::INFINITY;
        for (i, centre) in centroids.iter().enumerate() {
            let dist = metric.distance_unchecked(&point.coords, &centre.coords);
            if dist <= threshold {
                members.push(centre.cid);
            }
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest = i;
            }
        }
        if members.is_empty() {
            members.push(centroids[nearest].cid);
        }
        members
    });

    for (point, members) in ws.points.iter_mut().zip(memberships) {
        point.canopies = Some(members);
    }

    Ok(centroids)
}
