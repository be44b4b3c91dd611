//! Core type definitions for the clustering engine.

/// Stable 64-bit identifier for an input point.
///
/// Taken from the source relation when an id is supplied, otherwise
/// synthesized as a dense 1..N ordering at ingest.
pub type PointId = i64;

/// Dense centroid identifier in `[1, k]`.
///
/// Zero is reserved as the "not yet assigned" sentinel.
pub type CentroidId = u32;

/// Index type for dimensions within a sparse vector.
pub type DimensionIndex = u32;

/// Sentinel centroid id for points that have not been assigned yet.
pub const UNASSIGNED: CentroidId = 0;
