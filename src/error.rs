//! Error types for the clustering engine.
//!
//! Errors carry a stable, user-facing kind plus a human-readable
//! message. No error is swallowed; everything surfaces to the caller.

use std::fmt;
use thiserror::Error;

/// Stable error kinds exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: dimension mismatch, missing id, empty source.
    InvalidInput,
    /// A target output relation already exists.
    OutputExists,
    /// Fewer surviving points than requested centroids.
    InsufficientPoints,
    /// A caller-provided sample fraction yields a sample smaller than k.
    SampleTooSmall,
    /// A caller-provided canopy threshold is non-positive or t1 <= t2.
    InvalidThreshold,
    /// Canopy threshold estimation failed on a degenerate sample.
    ThresholdUnavailable,
    /// Unrecognized distance metric name.
    UnknownMetric,
    /// Unrecognized seeding method name.
    UnknownInitMethod,
    /// The run was cancelled at a phase boundary.
    Cancelled,
    /// Invariant violation inside the engine.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "INVALID_INPUT"),
            ErrorKind::OutputExists => write!(f, "OUTPUT_EXISTS"),
            ErrorKind::InsufficientPoints => write!(f, "INSUFFICIENT_POINTS"),
            ErrorKind::SampleTooSmall => write!(f, "SAMPLE_TOO_SMALL"),
            ErrorKind::InvalidThreshold => write!(f, "INVALID_THRESHOLD"),
            ErrorKind::ThresholdUnavailable => write!(f, "THRESHOLD_UNAVAILABLE"),
            ErrorKind::UnknownMetric => write!(f, "UNKNOWN_METRIC"),
            ErrorKind::UnknownInitMethod => write!(f, "UNKNOWN_INIT_METHOD"),
            ErrorKind::Cancelled => write!(f, "CANCELLED"),
            ErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Main error type for clustering operations.
#[derive(Error, Debug, Clone)]
pub struct ClusterError {
    kind: ErrorKind,
    message: String,
}

impl ClusterError {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    // Convenience constructors

    /// Malformed input (dimension mismatch, missing id, empty source).
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, msg)
    }

    /// A target output relation already exists.
    pub fn output_exists(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutputExists, msg)
    }

    /// Fewer surviving points than requested centroids.
    pub fn insufficient_points(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPoints, msg)
    }

    /// A caller-provided sample fraction yields too small a sample.
    pub fn sample_too_small(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::SampleTooSmall, msg)
    }

    /// A caller-provided canopy threshold is out of range.
    pub fn invalid_threshold(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidThreshold, msg)
    }

    /// Canopy threshold estimation failed.
    pub fn threshold_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ThresholdUnavailable, msg)
    }

    /// Unrecognized distance metric name.
    pub fn unknown_metric(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownMetric, msg)
    }

    /// Unrecognized seeding method name.
    pub fn unknown_init_method(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownInitMethod, msg)
    }

    /// The run was cancelled at a phase boundary.
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "run cancelled")
    }

    /// Invariant violation inside the engine.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg)
    }
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Result type alias for clustering operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ClusterError::invalid_input("points must have the same dimensions");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.message(), "points must have the same dimensions");
    }

    #[test]
    fn test_error_display() {
        let err = ClusterError::output_exists("relation 'out' already exists");
        let display = format!("{}", err);
        assert!(display.contains("OUTPUT_EXISTS"));
        assert!(display.contains("already exists"));
    }

    #[test]
    fn test_cancelled() {
        let err = ClusterError::cancelled();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
