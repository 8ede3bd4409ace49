//! Loss functions for PointNet training.
//!
//! This module provides:
//! - Orthogonality regularization: predicted transforms should stay close to rotations
//! - Classification and per-point segmentation cross-entropy
//! - Chamfer distance for autoencoder reconstruction

mod orthogonal;
mod task;

pub use orthogonal::{orthogonal_loss, OrthogonalLoss, DEFAULT_ORTHOGONAL_WEIGHT};
pub use task::{chamfer_distance, LossOutput, PointNetLoss};
