//! Data ingest and validation.
//!
//! Builds the working point set from a source relation: resolves point
//! ids, drops null vectors, and verifies dimensional consistency.

use std::collections::HashSet;

use crate::catalog::SourceRow;
use crate::error::{ClusterError, Result};
use crate::types::{CentroidId, DimensionIndex, PointId, UNASSIGNED};
use crate::vector::SparseVector;

/// A working point: source coordinates plus the engine's mutable
/// assignment state.
#[derive(Debug, Clone)]
pub struct Point {
    /// Stable identifier.
    pub pid: PointId,
    /// Coordinates.
    pub coords: SparseVector,
    /// Current centroid assignment; `UNASSIGNED` before iteration 1.
    pub cid: CentroidId,
    /// Candidate centroid ids for assignment. `None` means every
    /// centroid is a candidate (no canopy pre-partitioning).
    pub canopies: Option<Vec<CentroidId>>,
}

/// The validated working set for one clustering run.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    /// Surviving points, in source order.
    pub points: Vec<Point>,
    /// Common dimensionality of all points.
    pub dim: DimensionIndex,
    /// Row count of the source before null filtering.
    pub original_count: usize,
}

impl WorkingSet {
    /// Number of points that survived ingest.
    pub fn kept_count(&self) -> usize {
        self.points.len()
    }
}

/// Build the working set from source rows.
///
/// Ids are taken from the source when every row carries one (duplicates
/// are rejected); when no row does, a dense 1..N ordering is
/// synthesized. Mixed presence means the id column is partially
/// missing, which is malformed input.
pub fn build_working_set(rows: Vec<SourceRow>) -> Result<WorkingSet> {
    if rows.is_empty() {
        return Err(ClusterError::invalid_input("empty point source"));
    }

    let original_count = rows.len();
    let with_id = rows.iter().filter(|r| r.id.is_some()).count();
    if with_id != 0 && with_id != original_count {
        return Err(ClusterError::invalid_input(
            "some source rows are missing an id",
        ));
    }
    let use_source_ids = with_id == original_count;

    if use_source_ids {
        let mut seen = HashSet::with_capacity(original_count);
        for row in &rows {
            let id = row.id.unwrap_or_default();
            if !seen.insert(id) {
                return Err(ClusterError::invalid_input(format!(
                    "duplicate point id {}",
                    id
                )));
            }
        }
    }

    let mut points = Vec::with_capacity(original_count);
    for (ordinal, row) in rows.into_iter().enumerate() {
        // A vector with an undefined self-dot is null; skip it.
        if row.coords.is_null() {
            continue;
        }
        let pid = if use_source_ids {
            row.id.unwrap_or_default()
        } else {
            ordinal as PointId + 1
        };
        points.push(Point {
            pid,
            coords: row.coords,
            cid: UNASSIGNED,
            canopies: None,
        });
    }

    if points.is_empty() {
        return Err(ClusterError::invalid_input(
            "no points survived null filtering",
        ));
    }

    let min_dim = points.iter().map(|p| p.coords.dim()).min().unwrap_or(0);
    let max_dim = points.iter().map(|p| p.coords.dim()).max().unwrap_or(0);
    if min_dim != max_dim {
        return Err(ClusterError::invalid_input(
            "points must have the same dimensions",
        ));
    }

    Ok(WorkingSet {
        points,
        dim: max_dim,
        original_count,
    })
}
