//! Error types for pointnet.

use thiserror::Error;

/// Errors reported before a tensor reaches the engine.
///
/// Shape errors raised *inside* a forward pass are Burn's and propagate
/// unchanged; these variants cover configuration and input validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointNetError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape. `0` marks a dimension that may take any value.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// A point cloud (or a batch of them) with no points.
    #[error("point cloud is empty")]
    EmptyPointCloud,

    /// Clouds of different sizes in one batch.
    #[error("point cloud {index} has {got} points, expected {expected}")]
    InconsistentBatch {
        /// Index of the offending cloud in the batch.
        index: usize,
        /// Number of points of the first cloud.
        expected: usize,
        /// Number of points of the offending cloud.
        got: usize,
    },
}

impl PointNetError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for pointnet operations.
pub type Result<T> = std::result::Result<T, PointNetError>;
