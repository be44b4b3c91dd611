//! The clustering entry point.
//!
//! Validates parameters, creates the output relations up front,
//! ingests the source, dispatches to the configured seeder, runs the
//! Lloyd engine, optionally evaluates the model, and emits the two
//! output relations. All run-scoped state lives in a per-run context
//! value; there is no process-wide mutable state.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CentroidRow, PointRow, Relation};
use crate::config::{InitMethod, KMeansParams};
use crate::engine::{run_lloyd, CancelToken, LloydConfig};
use crate::error::{ClusterError, Result};
use crate::evaluate::evaluate_model;
use crate::ingest::{build_working_set, WorkingSet};
use crate::metric::Metric;
use crate::seed;
use crate::utils::random::RandomSampler;

/// The record returned by a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Source relation name.
    pub src: String,
    /// Points that survived ingest.
    pub kept_points: usize,
    /// Seeding method that was configured.
    pub init_method: InitMethod,
    /// Number of centroids in the output.
    pub k: usize,
    /// Distance metric used.
    pub metric: Metric,
    /// Iterations the engine ran.
    pub iterations: usize,
    /// Total within-cluster cost; `None` when evaluation is disabled.
    pub cost: Option<f64>,
    /// Simplified silhouette; `None` when evaluation is disabled.
    pub silhouette: Option<f64>,
    /// Name of the emitted points relation.
    pub out_points: String,
    /// Name of the emitted centroids relation.
    pub out_centroids: String,
}

/// Run-scoped state threaded through the phases.
struct RunContext {
    sampler: RandomSampler,
    cancel: CancelToken,
    verbose: bool,
}

/// Run k-means to completion.
pub fn run_kmeans(catalog: &mut Catalog, params: &KMeansParams) -> Result<RunSummary> {
    run_kmeans_cancellable(catalog, params, &CancelToken::new())
}

/// Run k-means with a cancellation token observed at phase boundaries.
pub fn run_kmeans_cancellable(
    catalog: &mut Catalog,
    params: &KMeansParams,
    cancel: &CancelToken,
) -> Result<RunSummary> {
    validate_params(catalog, params)?;

    // Output relations are created before any work so that name
    // collisions fail early. A failure in a later phase leaves them in
    // whatever state they reached.
    catalog.insert(&params.out_points, Relation::Points(Vec::new()))?;
    catalog.insert(&params.out_centroids, Relation::Centroids(Vec::new()))?;

    let ctx = RunContext {
        sampler: params
            .seed
            .map(RandomSampler::with_seed)
            .unwrap_or_default(),
        cancel: cancel.clone(),
        verbose: params.verbose,
    };

    execute(catalog, params, ctx)
}

fn execute(catalog: &mut Catalog, params: &KMeansParams, mut ctx: RunContext) -> Result<RunSummary> {
    let rows = catalog.scan_source(&params.src)?;
    let mut ws = build_working_set(rows)?;

    if ctx.verbose {
        tracing::info!(
            src = %params.src,
            original = ws.original_count,
            kept = ws.kept_count(),
            dim = ws.dim,
            "ingested point source"
        );
    } else {
        tracing::debug!(
            src = %params.src,
            original = ws.original_count,
            kept = ws.kept_count(),
            dim = ws.dim,
            "ingested point source"
        );
    }

    ctx.cancel.check()?;
    let centroids = seed_centroids(catalog, params, &mut ws, &mut ctx)?;
    let k = centroids.len();

    ctx.cancel.check()?;
    let outcome = run_lloyd(
        &mut ws,
        centroids,
        &LloydConfig {
            metric: params.metric,
            max_iter: params.effective_max_iter(),
            conv_threshold: params.effective_conv_threshold(),
            verbose: ctx.verbose,
        },
        &ctx.cancel,
    )?;

    ctx.cancel.check()?;
    let evaluation = if params.evaluate {
        Some(evaluate_model(&ws, &outcome.centroids, params.metric))
    } else {
        None
    };

    emit_outputs(catalog, params, &ws, &outcome.centroids)?;

    let summary = RunSummary {
        src: params.src.clone(),
        kept_points: ws.kept_count(),
        init_method: params.init_method,
        k,
        metric: params.metric,
        iterations: outcome.iterations,
        cost: evaluation.map(|e| e.cost),
        silhouette: evaluation.map(|e| e.silhouette),
        out_points: params.out_points.clone(),
        out_centroids: params.out_centroids.clone(),
    };

    if ctx.verbose {
        tracing::info!(
            k = summary.k,
            iterations = summary.iterations,
            cost = ?summary.cost,
            silhouette = ?summary.silhouette,
            "clustering finished"
        );
    }

    Ok(summary)
}

/// Dispatch to the configured seeding path.
fn seed_centroids(
    catalog: &Catalog,
    params: &KMeansParams,
    ws: &mut WorkingSet,
    ctx: &mut RunContext,
) -> Result<Vec<seed::Centroid>> {
    if let Some(relation) = &params.init_cset {
        let coords = catalog.scan_centroids(relation)?;
        return seed::provided_centroids(ws, coords);
    }

    match params.init_method {
        InitMethod::Random => {
            let k = required_k(params)?;
            seed::random::seed(ws, k, &mut ctx.sampler)
        }
        InitMethod::KmeansPlusPlus => {
            let k = required_k(params)?;
            seed::kmeanspp::seed(ws, k, params.sample_frac, params.metric, &mut ctx.sampler)
        }
        InitMethod::Canopy => {
            seed::canopy::seed(ws, params.t1, params.t2, params.metric, &mut ctx.sampler)
        }
    }
}

fn required_k(params: &KMeansParams) -> Result<usize> {
    match params.k {
        Some(k) if k > 0 => Ok(k),
        Some(_) => Err(ClusterError::invalid_input("k must be positive")),
        None => Err(ClusterError::invalid_input(
            "k is required unless centroids are provided or canopy seeding is selected",
        )),
    }
}

/// Parameter validation. Everything here fails before any output
/// relation is created.
fn validate_params(catalog: &Catalog, params: &KMeansParams) -> Result<()> {
    crate::catalog::validate_identifier(&params.out_points)?;
    crate::catalog::validate_identifier(&params.out_centroids)?;

    match catalog.get(&params.src) {
        Some(Relation::Source(_)) | Some(Relation::Points(_)) => {}
        Some(Relation::Centroids(_)) => {
            return Err(ClusterError::invalid_input(format!(
                "source relation '{}' holds centroids, not points",
                params.src
            )))
        }
        None => {
            return Err(ClusterError::invalid_input(format!(
                "no relation named '{}'",
                params.src
            )))
        }
    }

    if let Some(relation) = &params.init_cset {
        if catalog.get(relation).is_none() {
            return Err(ClusterError::invalid_input(format!(
                "no relation named '{}'",
                relation
            )));
        }
    } else if params.init_method != InitMethod::Canopy {
        required_k(params)?;
    }

    if let Some(frac) = params.sample_frac {
        if !(frac > 0.0 && frac <= 1.0) {
            return Err(ClusterError::invalid_input(format!(
                "sample_frac must be in (0, 1], got {}",
                frac
            )));
        }
    }

    if params.init_method == InitMethod::Canopy && params.init_cset.is_none() {
        for (name, value) in [("t1", params.t1), ("t2", params.t2)] {
            if let Some(v) = value {
                if v <= 0.0 {
                    return Err(ClusterError::invalid_threshold(format!(
                        "{} must be positive, got {}",
                        name, v
                    )));
                }
            }
        }
        if let (Some(t1), Some(t2)) = (params.t1, params.t2) {
            if t1 <= t2 {
                return Err(ClusterError::invalid_threshold(format!(
                    "t1 ({}) must exceed t2 ({})",
                    t1, t2
                )));
            }
        }
    }

    Ok(())
}

fn emit_outputs(
    catalog: &mut Catalog,
    params: &KMeansParams,
    ws: &WorkingSet,
    centroids: &[seed::Centroid],
) -> Result<()> {
    let point_rows: Vec<PointRow> = ws
        .points
        .iter()
        .map(|p| PointRow {
            pid: p.pid,
            coords: p.coords.clone(),
            cid: p.cid,
        })
        .collect();
    let centroid_rows: Vec<CentroidRow> = centroids
        .iter()
        .map(|c| CentroidRow {
            cid: c.cid,
            coords: c.coords.clone(),
        })
        .collect();

    catalog.fill(&params.out_points, Relation::Points(point_rows))?;
    catalog.fill(&params.out_centroids, Relation::Centroids(centroid_rows))?;
    Ok(())
}
