//! In-memory storage collaborator.
//!
//! The engine does not own a database; it requires a substrate that can
//! scan a relation, materialize result tables, and detect name
//! collisions up front. `Catalog` is that substrate: a registry of
//! named relations. Intermediate working sets never enter the catalog;
//! they are plain run-owned values and die with the run on every exit
//! path.

use std::collections::HashMap;

use crate::error::{ClusterError, Result};
use crate::types::{CentroidId, PointId};
use crate::vector::SparseVector;

/// One row of a point source: an optional stable id plus coordinates.
#[derive(Debug, Clone)]
pub struct SourceRow {
    /// Stable identifier, if the source carries one.
    pub id: Option<PointId>,
    /// Point coordinates.
    pub coords: SparseVector,
}

impl SourceRow {
    /// Row with an explicit id.
    pub fn with_id(id: PointId, coords: SparseVector) -> Self {
        Self {
            id: Some(id),
            coords,
        }
    }

    /// Row without an id; ingest will synthesize one.
    pub fn anonymous(coords: SparseVector) -> Self {
        Self { id: None, coords }
    }
}

/// One row of a clustered-points output relation.
#[derive(Debug, Clone)]
pub struct PointRow {
    /// Stable point identifier.
    pub pid: PointId,
    /// Point coordinates.
    pub coords: SparseVector,
    /// Assigned centroid id.
    pub cid: CentroidId,
}

/// One row of a centroids output relation.
#[derive(Debug, Clone)]
pub struct CentroidRow {
    /// Dense centroid id in [1, k].
    pub cid: CentroidId,
    /// Centroid coordinates.
    pub coords: SparseVector,
}

/// A named relation held by the catalog.
#[derive(Debug, Clone)]
pub enum Relation {
    /// Raw input points.
    Source(Vec<SourceRow>),
    /// Clustered points (pid, coords, cid).
    Points(Vec<PointRow>),
    /// Centroids (cid, coords).
    Centroids(Vec<CentroidRow>),
}

impl Relation {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Relation::Source(rows) => rows.len(),
            Relation::Points(rows) => rows.len(),
            Relation::Centroids(rows) => rows.len(),
        }
    }

    /// Whether the relation has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of named relations.
#[derive(Debug, Default)]
pub struct Catalog {
    relations: HashMap<String, Relation>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation under a name. Fails with `OutputExists` when
    /// the name is already taken.
    pub fn insert(&mut self, name: &str, relation: Relation) -> Result<()> {
        validate_identifier(name)?;
        if self.relations.contains_key(name) {
            return Err(ClusterError::output_exists(format!(
                "relation '{}' already exists",
                name
            )));
        }
        self.relations.insert(name.to_string(), relation);
        Ok(())
    }

    /// Register a source relation.
    pub fn insert_source(&mut self, name: &str, rows: Vec<SourceRow>) -> Result<()> {
        self.insert(name, Relation::Source(rows))
    }

    /// Replace the contents of an existing relation.
    pub fn fill(&mut self, name: &str, relation: Relation) -> Result<()> {
        match self.relations.get_mut(name) {
            Some(slot) => {
                *slot = relation;
                Ok(())
            }
            None => Err(ClusterError::internal(format!(
                "relation '{}' was not created",
                name
            ))),
        }
    }

    /// Look up a relation.
    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Whether a relation with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Remove a relation. Returns whether it existed.
    pub fn drop_relation(&mut self, name: &str) -> bool {
        self.relations.remove(name).is_some()
    }

    /// Delete all rows of a relation, keeping the name registered.
    pub fn truncate(&mut self, name: &str) -> Result<()> {
        match self.relations.get_mut(name) {
            Some(Relation::Source(rows)) => rows.clear(),
            Some(Relation::Points(rows)) => rows.clear(),
            Some(Relation::Centroids(rows)) => rows.clear(),
            None => {
                return Err(ClusterError::invalid_input(format!(
                    "no relation named '{}'",
                    name
                )))
            }
        }
        Ok(())
    }

    /// Scan a relation as a point source. `Points` relations also
    /// qualify: their pids are kept and their assignments ignored.
    pub fn scan_source(&self, name: &str) -> Result<Vec<SourceRow>> {
        match self.relations.get(name) {
            Some(Relation::Source(rows)) => Ok(rows.clone()),
            Some(Relation::Points(rows)) => Ok(rows
                .iter()
                .map(|r| SourceRow::with_id(r.pid, r.coords.clone()))
                .collect()),
            Some(Relation::Centroids(_)) => Err(ClusterError::invalid_input(format!(
                "relation '{}' holds centroids, not points",
                name
            ))),
            None => Err(ClusterError::invalid_input(format!(
                "no relation named '{}'",
                name
            ))),
        }
    }

    /// Read a relation as initial centroid positions. Any relation
    /// kind qualifies; only the coordinates are used.
    pub fn scan_centroids(&self, name: &str) -> Result<Vec<SparseVector>> {
        match self.relations.get(name) {
            Some(Relation::Centroids(rows)) => {
                Ok(rows.iter().map(|r| r.coords.clone()).collect())
            }
            Some(Relation::Points(rows)) => Ok(rows.iter().map(|r| r.coords.clone()).collect()),
            Some(Relation::Source(rows)) => Ok(rows.iter().map(|r| r.coords.clone()).collect()),
            None => Err(ClusterError::invalid_input(format!(
                "no relation named '{}'",
                name
            ))),
        }
    }

    /// Typed accessor for a points relation.
    pub fn points(&self, name: &str) -> Option<&[PointRow]> {
        match self.relations.get(name) {
            Some(Relation::Points(rows)) => Some(rows),
            _ => None,
        }
    }

    /// Typed accessor for a centroids relation.
    pub fn centroids(&self, name: &str) -> Option<&[CentroidRow]> {
        match self.relations.get(name) {
            Some(Relation::Centroids(rows)) => Some(rows),
            _ => None,
        }
    }
}

/// Validate a relation identifier.
///
/// The catalog has no SQL dialect, so quoting collapses to rejecting
/// names that could not round-trip through one.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ClusterError::invalid_input("empty relation name"));
    }
    if name.contains('\0') {
        return Err(ClusterError::invalid_input(
            "relation name contains a NUL byte",
        ));
    }
    if name.trim() != name {
        return Err(ClusterError::invalid_input(format!(
            "relation name '{}' has surrounding whitespace",
            name
        )));
    }
    Ok(())
}
