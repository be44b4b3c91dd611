//! Centroid seeding strategies.
//!
//! Three interchangeable seeders produce the initial centroid set:
//! uniform random selection, k-means++ weighted seeding, and
//! canopy-based seeding. A fourth path accepts caller-provided
//! centroids and skips seeding entirely. All paths hand the iteration
//! engine centroids with dense ids 1..k in insertion order.

pub mod canopy;
pub mod kmeanspp;
pub mod random;

use crate::error::{ClusterError, Result};
use crate::ingest::WorkingSet;
use crate::types::CentroidId;
use crate::vector::SparseVector;

pub use canopy::CanopyThresholds;

/// One centroid: a dense id plus a position. The position is never
/// null; orphaned centroids keep their previous coordinates.
#[derive(Debug, Clone)]
pub struct Centroid {
    /// Dense id in [1, k].
    pub cid: CentroidId,
    /// Centroid coordinates.
    pub coords: SparseVector,
}

/// Adopt caller-provided centroid positions, re-labelling them densely
/// 1..k in arrival order. k is derived from the row count.
pub fn provided_centroids(ws: &WorkingSet, coords: Vec<SparseVector>) -> Result<Vec<Centroid>> {
    if coords.is_empty() {
        return Err(ClusterError::invalid_input(
            "initial centroid relation is empty",
        ));
    }
    if ws.kept_count() < coords.len() {
        return Err(ClusterError::insufficient_points(format!(
            "{} points remain after filtering but {} centroids were provided",
            ws.kept_count(),
            coords.len()
        )));
    }
    for c in &coords {
        if c.dim() != ws.dim {
            return Err(ClusterError::invalid_input(format!(
                "centroid dimension {} does not match point dimension {}",
                c.dim(),
                ws.dim
            )));
        }
    }

    Ok(coords
        .into_iter()
        .enumerate()
        .map(|(i, coords)| Centroid {
            cid: i as CentroidId + 1,
            coords,
        })
        .collect())
}
