//! Run configuration for the clustering engine.

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};
use crate::metric::Metric;

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 20;

/// Default convergence threshold on the reassignment fraction.
pub const DEFAULT_CONV_THRESHOLD: f64 = 0.001;

/// Default k-means++ sub-sample fraction.
pub const DEFAULT_SAMPLE_FRAC: f64 = 0.01;

/// Centroid seeding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InitMethod {
    /// Uniform random selection of k points.
    #[default]
    Random,

    /// Weighted seeding: each successive centroid drawn with
    /// probability proportional to squared distance to the nearest
    /// already-chosen centroid.
    KmeansPlusPlus,

    /// Threshold-based canopy construction; k is derived from the
    /// surviving canopy centres.
    Canopy,
}

impl InitMethod {
    /// Parse a seeding method name.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "random" => Ok(InitMethod::Random),
            "kmeans++" | "kmeanspp" => Ok(InitMethod::KmeansPlusPlus),
            "canopy" => Ok(InitMethod::Canopy),
            other => Err(ClusterError::unknown_init_method(format!(
                "unknown init method '{}'",
                other
            ))),
        }
    }

    /// Canonical name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            InitMethod::Random => "random",
            InitMethod::KmeansPlusPlus => "kmeans++",
            InitMethod::Canopy => "canopy",
        }
    }
}

impl std::fmt::Display for InitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parameters for one clustering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Name of the source relation.
    pub src: String,

    /// Optional relation holding explicit initial centroids. When set,
    /// seeding is skipped and k is derived from its row count.
    pub init_cset: Option<String>,

    /// Seeding method, used when `init_cset` is absent.
    pub init_method: InitMethod,

    /// k-means++ sub-sample fraction in (0, 1]. `None` selects the
    /// default behavior (a target of n/100, falling back to the full
    /// set when that is smaller than k); an explicit value that yields
    /// a sample smaller than k is an error.
    pub sample_frac: Option<f64>,

    /// Number of centroids. Required unless centroids are provided or
    /// canopy seeding is selected.
    pub k: Option<usize>,

    /// Canopy outer threshold; estimated when absent.
    pub t1: Option<f64>,

    /// Canopy inner threshold; estimated when absent.
    pub t2: Option<f64>,

    /// Distance metric.
    pub metric: Metric,

    /// Iteration cap; non-positive or absent selects
    /// [`DEFAULT_MAX_ITER`].
    pub max_iter: Option<usize>,

    /// Convergence threshold on the reassignment fraction;
    /// non-positive or absent selects [`DEFAULT_CONV_THRESHOLD`].
    pub conv_threshold: Option<f64>,

    /// Whether to compute cost and simplified silhouette.
    pub evaluate: bool,

    /// Name of the output points relation.
    pub out_points: String,

    /// Name of the output centroids relation.
    pub out_centroids: String,

    /// Promote per-iteration progress to info-level log events.
    pub verbose: bool,

    /// Random seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl KMeansParams {
    /// Create parameters for a run reading `src` and writing
    /// `out_points` / `out_centroids`.
    pub fn new(src: &str, out_points: &str, out_centroids: &str) -> Self {
        Self {
            src: src.to_string(),
            init_cset: None,
            init_method: InitMethod::default(),
            sample_frac: None,
            k: None,
            t1: None,
            t2: None,
            metric: Metric::default(),
            max_iter: None,
            conv_threshold: None,
            evaluate: true,
            out_points: out_points.to_string(),
            out_centroids: out_centroids.to_string(),
            verbose: false,
            seed: None,
        }
    }

    /// Set the number of centroids.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the seeding method.
    pub fn with_init_method(mut self, method: InitMethod) -> Self {
        self.init_method = method;
        self
    }

    /// Provide explicit initial centroids from a relation.
    pub fn with_initial_centroids(mut self, relation: &str) -> Self {
        self.init_cset = Some(relation.to_string());
        self
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the k-means++ sub-sample fraction.
    pub fn with_sample_frac(mut self, frac: f64) -> Self {
        self.sample_frac = Some(frac);
        self
    }

    /// Set the canopy thresholds.
    pub fn with_thresholds(mut self, t1: f64, t2: f64) -> Self {
        self.t1 = Some(t1);
        self.t2 = Some(t2);
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    /// Set the convergence threshold.
    pub fn with_conv_threshold(mut self, threshold: f64) -> Self {
        self.conv_threshold = Some(threshold);
        self
    }

    /// Enable or disable model evaluation.
    pub fn with_evaluate(mut self, evaluate: bool) -> Self {
        self.evaluate = evaluate;
        self
    }

    /// Enable verbose progress logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Iteration cap after default substitution.
    pub fn effective_max_iter(&self) -> usize {
        match self.max_iter {
            Some(m) if m > 0 => m,
            _ => DEFAULT_MAX_ITER,
        }
    }

    /// Convergence threshold after default substitution.
    pub fn effective_conv_threshold(&self) -> f64 {
        match self.conv_threshold {
            Some(t) if t > 0.0 => t,
            _ => DEFAULT_CONV_THRESHOLD,
        }
    }
}
