//! # lloyd: a k-means clustering engine
//!
//! `lloyd` clusters large collections of (possibly sparse) numeric
//! vectors: given a point source, a distance metric, and a seeding
//! strategy, it produces a final set of k centroids and an assignment
//! of every point to one of them, iterating Lloyd's algorithm until
//! the reassignment fraction drops below a threshold or an iteration
//! cap is reached.
//!
//! ## Features
//!
//! - **Three seeding strategies**: uniform random sampling, k-means++
//!   weighted seeding, and canopy-based seeding (which also bounds the
//!   assignment search per point)
//! - **Four distance metrics**: l1norm, l2norm, cosine (as an angle),
//!   and tanimoto, each with its own centroid aggregation rule
//! - **Sticky orphan centroids**: a centroid no point prefers keeps
//!   its previous position instead of vanishing
//! - **Model evaluation**: total within-cluster cost and a simplified
//!   silhouette coefficient
//! - **Data-parallel phases**: assignment and evaluation fan out over
//!   rayon once the working set is large enough
//!
//! ## Quick Start
//!
//! ```rust
//! use lloyd::prelude::*;
//!
//! // Register a point source in the catalog.
//! let mut catalog = Catalog::new();
//! let rows: Vec<SourceRow> = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![10.0, 10.0],
//!     vec![10.0, 11.0],
//! ]
//! .into_iter()
//! .map(|p| SourceRow::anonymous(SparseVector::from_dense(&p)))
//! .collect();
//! catalog.insert_source("points", rows).unwrap();
//!
//! // Cluster into two groups.
//! let params = KMeansParams::new("points", "out_points", "out_centroids")
//!     .with_k(2)
//!     .with_seed(42);
//! let summary = run_kmeans(&mut catalog, &params).unwrap();
//!
//! assert_eq!(summary.k, 2);
//! assert_eq!(catalog.points("out_points").unwrap().len(), 4);
//! ```
//!
//! ## Seeding strategies
//!
//! | Method | Behavior |
//! |--------|----------|
//! | `random` | k points drawn uniformly via a Chernoff-bounded Bernoulli filter |
//! | `kmeans++` | successive centroids drawn with probability proportional to squared distance to the nearest chosen one, over an optional sub-sample |
//! | `canopy` | threshold-defined canopies become the centroids and bound each point's candidate set |
//!
//! Explicit initial centroids can be supplied instead through
//! [`KMeansParams::with_initial_centroids`]; seeding is then skipped
//! and k is derived.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod engine;
pub mod evaluate;
pub mod ingest;
pub mod sample;
pub mod seed;
pub mod utils;
pub mod vector;

mod config;
mod error;
mod metric;
mod run;
mod types;

pub use config::{
    InitMethod, KMeansParams, DEFAULT_CONV_THRESHOLD, DEFAULT_MAX_ITER, DEFAULT_SAMPLE_FRAC,
};
pub use engine::{CancelToken, LloydConfig, LloydOutcome};
pub use error::{ClusterError, ErrorKind, Result};
pub use metric::Metric;
pub use run::{run_kmeans, run_kmeans_cancellable, RunSummary};
pub use types::{CentroidId, DimensionIndex, PointId, UNASSIGNED};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::catalog::{Catalog, CentroidRow, PointRow, Relation, SourceRow};
    pub use crate::config::{InitMethod, KMeansParams};
    pub use crate::engine::{CancelToken, LloydConfig, LloydOutcome};
    pub use crate::error::{ClusterError, ErrorKind, Result};
    pub use crate::evaluate::{evaluate_model, Evaluation};
    pub use crate::ingest::{build_working_set, Point, WorkingSet};
    pub use crate::metric::Metric;
    pub use crate::run::{run_kmeans, run_kmeans_cancellable, RunSummary};
    pub use crate::seed::{Centroid, CanopyThresholds};
    pub use crate::types::{CentroidId, DimensionIndex, PointId, UNASSIGNED};
    pub use crate::vector::SparseVector;
}
