//! PointNet network modules.
//!
//! This module provides:
//! - Spatial transformer (T-Net) predicting alignment matrices
//! - The max-pooled feature extractor shared by every head
//! - Classification, part segmentation and autoencoder heads
//! - MLP building blocks for constructing custom architectures

mod autoencoder;
mod cls;
mod feat;
pub mod mlp;
mod seg;
mod stn;

use burn::prelude::*;

use crate::error::{PointNetError, Result};

pub use autoencoder::{PointCloudDecoder, PointNetAutoEncoder};
pub use cls::{ClsOutput, PointNetCls};
pub use feat::{FeatOutput, PointNetFeat};
pub use mlp::{Mlp, MlpConfig};
pub use seg::{PointNetPartSeg, SegOutput};
pub use stn::SpatialTransformer;

pub(crate) use stn::identity_matrix;

/// Check that `points` is a non-empty `[batch, num_points, 3]` cloud batch.
pub fn validate_point_cloud<B: Backend>(points: &Tensor<B, 3>) -> Result<()> {
    let [batch, num_points, coords] = points.dims();
    if coords != 3 {
        return Err(PointNetError::ShapeMismatch {
            expected: vec![batch, num_points, 3],
            got: vec![batch, num_points, coords],
        });
    }
    if batch == 0 || num_points == 0 {
        return Err(PointNetError::EmptyPointCloud);
    }
    Ok(())
}
