//! Distance metrics and per-metric centroid aggregation.
//!
//! The metric is a tagged variant exposing the two capabilities the
//! engine needs: point-to-point distance and the centroid update rule
//! for a cluster of points.

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};
use crate::vector::{l1_diff, squared_l2_diff, SparseVector};

/// The available distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Sum of absolute componentwise differences.
    L1Norm,

    /// Euclidean distance.
    #[default]
    L2Norm,

    /// Angle between the vectors, in radians.
    Cosine,

    /// 1 - dot(u,v) / (|u|^2 + |v|^2 - dot(u,v)).
    Tanimoto,
}

impl Metric {
    /// Parse a metric name. Accepts the aliases `manhattan` for
    /// `l1norm` and `euclidean` for `l2norm`, case-insensitively.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "l1norm" | "manhattan" => Ok(Metric::L1Norm),
            "l2norm" | "euclidean" => Ok(Metric::L2Norm),
            "cosine" => Ok(Metric::Cosine),
            "tanimoto" => Ok(Metric::Tanimoto),
            other => Err(ClusterError::unknown_metric(format!(
                "unknown distance metric '{}'",
                other
            ))),
        }
    }

    /// Canonical name of this metric.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::L1Norm => "l1norm",
            Metric::L2Norm => "l2norm",
            Metric::Cosine => "cosine",
            Metric::Tanimoto => "tanimoto",
        }
    }

    /// Compute the distance between two vectors.
    ///
    /// Vectors of different dimensions are incomparable.
    pub fn distance(&self, u: &SparseVector, v: &SparseVector) -> Result<f64> {
        if u.dim() != v.dim() {
            return Err(ClusterError::invalid_input(format!(
                "dimension mismatch: {} vs {}",
                u.dim(),
                v.dim()
            )));
        }
        Ok(self.distance_unchecked(u, v))
    }

    /// Distance without the dimension check, for hot loops over a
    /// working set whose dimensional consistency was verified at
    /// ingest.
    pub(crate) fn distance_unchecked(&self, u: &SparseVector, v: &SparseVector) -> f64 {
        match self {
            Metric::L1Norm => l1_diff(u, v),
            Metric::L2Norm => squared_l2_diff(u, v).sqrt(),
            Metric::Cosine => {
                let norm_u = u.norm2();
                let norm_v = v.norm2();
                if norm_u == 0.0 || norm_v == 0.0 {
                    // All-zero vector: orthogonal by convention.
                    return std::f64::consts::FRAC_PI_2;
                }
                let cos = (u.dot(v) / (norm_u * norm_v)).clamp(-1.0, 1.0);
                cos.acos()
            }
            Metric::Tanimoto => {
                let dot = u.dot(v);
                let denom = u.squared_norm() + v.squared_norm() - dot;
                if denom == 0.0 {
                    // Both vectors are all-zero, hence identical.
                    return 0.0;
                }
                1.0 - dot / denom
            }
        }
    }

    /// The per-metric centroid update for a cluster of points.
    ///
    /// For l1norm and l2norm this is the componentwise arithmetic mean;
    /// for cosine and tanimoto, the componentwise mean of the
    /// normalized points. Returns `None` for an empty cluster; the
    /// caller keeps the previous centroid position (orphans are never
    /// nulled out).
    pub fn aggregate<'a, I>(&self, points: I) -> Option<SparseVector>
    where
        I: IntoIterator<Item = &'a SparseVector>,
    {
        let normalize_first = matches!(self, Metric::Cosine | Metric::Tanimoto);

        let mut acc: Option<Vec<f64>> = None;
        let mut count = 0usize;

        for point in points {
            let acc = acc.get_or_insert_with(|| vec![0.0f64; point.dim() as usize]);
            if normalize_first {
                for (idx, val) in point.normalize().iter_nonzero() {
                    acc[idx as usize] += val;
                }
            } else {
                for (idx, val) in point.iter_nonzero() {
                    acc[idx as usize] += val;
                }
            }
            count += 1;
        }

        let mut acc = acc?;
        for v in acc.iter_mut() {
            *v /= count as f64;
        }
        Some(SparseVector::from_dense(&acc))
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sv(dense: &[f64]) -> SparseVector {
        SparseVector::from_dense(dense)
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Metric::parse("manhattan").unwrap(), Metric::L1Norm);
        assert_eq!(Metric::parse("L1NORM").unwrap(), Metric::L1Norm);
        assert_eq!(Metric::parse("euclidean").unwrap(), Metric::L2Norm);
        assert_eq!(Metric::parse("cosine").unwrap(), Metric::Cosine);
        assert_eq!(Metric::parse("tanimoto").unwrap(), Metric::Tanimoto);
        assert!(Metric::parse("chebyshev").is_err());
    }

    #[test]
    fn test_l1_distance() {
        let d = Metric::L1Norm.distance(&sv(&[1.0, 2.0]), &sv(&[4.0, 0.0])).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_l2_distance() {
        let d = Metric::L2Norm.distance(&sv(&[0.0, 0.0]), &sv(&[3.0, 4.0])).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_is_an_angle() {
        let d = Metric::Cosine
            .distance(&sv(&[1.0, 0.0]), &sv(&[0.0, 1.0]))
            .unwrap();
        assert!((d - FRAC_PI_2).abs() < 1e-12);

        let d = Metric::Cosine
            .distance(&sv(&[1.0, 0.0]), &sv(&[-1.0, 0.0]))
            .unwrap();
        assert!((d - PI).abs() < 1e-12);

        // Colinear vectors are at angle zero regardless of magnitude.
        let d = Metric::Cosine
            .distance(&sv(&[1.0, 0.0]), &sv(&[2.0, 0.0]))
            .unwrap();
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector_is_orthogonal() {
        let d = Metric::Cosine
            .distance(&sv(&[0.0, 0.0]), &sv(&[1.0, 1.0]))
            .unwrap();
        assert!((d - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_tanimoto() {
        let d = Metric::Tanimoto
            .distance(&sv(&[1.0, 1.0]), &sv(&[1.0, 1.0]))
            .unwrap();
        assert!(d.abs() < 1e-12);

        // dot = 0, norms 1 each: 1 - 0/2 = 1.
        let d = Metric::Tanimoto
            .distance(&sv(&[1.0, 0.0]), &sv(&[0.0, 1.0]))
            .unwrap();
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tanimoto_zero_vectors() {
        let d = Metric::Tanimoto.distance(&sv(&[0.0]), &sv(&[0.0])).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Metric::L2Norm
            .distance(&sv(&[1.0, 2.0]), &sv(&[1.0, 2.0, 3.0]))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_aggregate_mean() {
        let points = [sv(&[0.0, 0.0]), sv(&[0.0, 1.0])];
        let c = Metric::L2Norm.aggregate(points.iter()).unwrap();
        assert_eq!(c.to_dense(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_aggregate_normalizes_for_cosine() {
        // Mean of normalized [1,0] and [2,0] is [1,0], not [1.5,0].
        let points = [sv(&[1.0, 0.0]), sv(&[2.0, 0.0])];
        let c = Metric::Cosine.aggregate(points.iter()).unwrap();
        assert_eq!(c.to_dense(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert!(Metric::L2Norm.aggregate(std::iter::empty()).is_none());
    }

    #[test]
    fn test_metric_serde_round_trip() {
        let json = serde_json::to_string(&Metric::Tanimoto).unwrap();
        let back: Metric = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Metric::Tanimoto);
    }
}
