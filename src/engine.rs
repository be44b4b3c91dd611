//! The Lloyd iteration engine.
//!
//! Bulk-synchronous iteration over a double-buffered working set:
//! assignment and centroid refresh are pure maps over the current
//! buffers, and the only cross-phase mutation is the swap of the
//! assignment buffer and the centroid array between iterations. No
//! phase observes a partially written centroid array.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ClusterError, Result};
use crate::ingest::WorkingSet;
use crate::metric::Metric;
use crate::seed::Centroid;
use crate::types::{CentroidId, UNASSIGNED};
use crate::utils::parallel::maybe_parallel_map;
use crate::vector::SparseVector;

/// Cooperative cancellation handle, observed at phase boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The run stops at the next phase boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ClusterError::cancelled())
        } else {
            Ok(())
        }
    }
}

/// Configuration for the iteration engine.
#[derive(Debug, Clone, Copy)]
pub struct LloydConfig {
    /// Distance metric; also selects the centroid aggregation rule.
    pub metric: Metric,
    /// Iteration cap.
    pub max_iter: usize,
    /// Stop once the reassignment fraction drops below this.
    pub conv_threshold: f64,
    /// Promote per-iteration progress to info-level events.
    pub verbose: bool,
}

/// Result of running the iteration engine to a fixed point.
#[derive(Debug, Clone)]
pub struct LloydOutcome {
    /// Final centroid positions, ordered by cid.
    pub centroids: Vec<Centroid>,
    /// Reassignment fraction per iteration, starting at iteration 1.
    /// The head is 1.0 because every point starts unassigned.
    pub convergence_log: Vec<f64>,
    /// Number of iterations run.
    pub iterations: usize,
}

/// Iterate assignment and centroid refresh until fewer than
/// `conv_threshold` of the points change centroid, or `max_iter`
/// iterations have run.
///
/// Assignment searches each point's canopy set when one is present,
/// otherwise all centroids; ties resolve to the lowest cid. A centroid
/// that attracts no points keeps its previous position.
pub fn run_lloyd(
    ws: &mut WorkingSet,
    mut centroids: Vec<Centroid>,
    config: &LloydConfig,
    cancel: &CancelToken,
) -> Result<LloydOutcome> {
    if centroids.is_empty() {
        return Err(ClusterError::invalid_input("no initial centroids"));
    }
    centroids.sort_by_key(|c| c.cid);
    for (i, c) in centroids.iter().enumerate() {
        if c.cid != i as CentroidId + 1 {
            return Err(ClusterError::internal(format!(
                "centroid ids are not dense: expected {}, found {}",
                i + 1,
                c.cid
            )));
        }
    }

    let metric = config.metric;
    let kept_count = ws.kept_count();
    let mut convergence_log = Vec::new();
    let mut iterations = 0;

    for iteration in 1..=config.max_iter {
        cancel.check()?;

        // Assignment phase against the iteration's centroid snapshot.
        let snapshot = &centroids;
        let new_cids: Vec<CentroidId> = maybe_parallel_map(&ws.points, |point| {
            nearest_centroid(&point.coords, point.canopies.as_deref(), snapshot, metric)
        });

        cancel.check()?;

        // Refresh phase: per-cid aggregate over the new assignment.
        let mut clusters: Vec<Vec<&SparseVector>> = vec![Vec::new(); centroids.len()];
        for (point, &cid) in ws.points.iter().zip(&new_cids) {
            clusters[cid as usize - 1].push(&point.coords);
        }
        let refreshed: Vec<Option<SparseVector>> = clusters
            .iter()
            .map(|cluster| metric.aggregate(cluster.iter().copied()))
            .collect();
        for (centroid, coords) in centroids.iter_mut().zip(refreshed) {
            if let Some(coords) = coords {
                centroid.coords = coords;
            }
            // Orphan centroids keep their previous position.
        }

        // Convergence bookkeeping, then the buffer swap.
        let changed = ws
            .points
            .iter()
            .zip(&new_cids)
            .filter(|&(point, &cid)| point.cid != cid)
            .count();
        let delta = changed as f64 / kept_count as f64;
        for (point, cid) in ws.points.iter_mut().zip(new_cids) {
            point.cid = cid;
        }
        convergence_log.push(delta);
        iterations = iteration;

        if config.verbose {
            tracing::info!(iteration, delta, "lloyd iteration");
        } else {
            tracing::debug!(iteration, delta, "lloyd iteration");
        }

        if delta < config.conv_threshold {
            break;
        }
    }

    Ok(LloydOutcome {
        centroids,
        convergence_log,
        iterations,
    })
}

/// Argmin over the candidate centroids; ties go to the lowest cid.
fn nearest_centroid(
    coords: &SparseVector,
    canopies: Option<&[CentroidId]>,
    centroids: &[Centroid],
    metric: Metric,
) -> CentroidId {
    let mut best = UNASSIGNED;
    let mut best_dist = f64::INFINITY;

    match canopies {
        Some(candidates) => {
            for &cid in candidates {
                let centre = &centroids[cid as usize - 1];
                let dist = metric.distance_unchecked(coords, &centre.coords);
                if dist < best_dist {
                    best_dist = dist;
                    best = cid;
                }
            }
        }
        None => {
            for centre in centroids {
                let dist = metric.distance_unchecked(coords, &centre.coords);
                if dist < best_dist {
                    best_dist = dist;
                    best = centre.cid;
                }
            }
        }
    }

    debug_assert_ne!(best, UNASSIGNED, "canopy sets are never empty");
    best
}
