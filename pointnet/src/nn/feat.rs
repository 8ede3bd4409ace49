//! Max-pooled PointNet feature extractor.

use burn::module::Module;
use burn::prelude::*;

use crate::config::{
    PointNetFeatConfig, SpatialTransformerConfig, GLOBAL_FEATURE_DIM, POINT_FEATURE_DIM,
};
use crate::error::Result;

use super::mlp::{Mlp, MlpConfig};
use super::stn::SpatialTransformer;
use super::validate_point_cloud;

/// Everything the feature extractor computes in one pass.
#[derive(Debug, Clone)]
pub struct FeatOutput<B: Backend> {
    /// Pooled global feature: [batch, 1024]
    pub global: Tensor<B, 2>,
    /// Per-point features after feature alignment: [batch, num_points, 64]
    pub point_features: Tensor<B, 3>,
    /// Input alignment: [batch, 3, 3], if enabled.
    pub input_transform: Option<Tensor<B, 3>>,
    /// Feature alignment: [batch, 64, 64], if enabled.
    pub feature_transform: Option<Tensor<B, 3>>,
}

impl<B: Backend> FeatOutput<B> {
    /// The transforms that were applied, input alignment first.
    pub fn transforms(&self) -> impl Iterator<Item = &Tensor<B, 3>> {
        self.input_transform
            .iter()
            .chain(self.feature_transform.iter())
    }
}

/// PointNet feature extractor.
///
/// Maps a batch of point clouds to one permutation-invariant 1024-dim
/// descriptor per cloud. The alignment transformers are present exactly
/// when enabled in the configuration.
#[derive(Module, Debug)]
pub struct PointNetFeat<B: Backend> {
    /// 3x3 input alignment.
    stn3: Option<SpatialTransformer<B>>,
    /// 64x64 feature alignment.
    stn64: Option<SpatialTransformer<B>>,
    /// Shared per-point MLP 3 -> 64 -> 64.
    pw_mlp: Mlp<B>,
    /// Shared per-point MLP 64 -> 64 -> 128 -> 1024.
    pw_mlp2: Mlp<B>,
}

impl PointNetFeatConfig {
    /// Initialize the feature extractor.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PointNetFeat<B>> {
        let stn3 = self
            .input_transform
            .then(|| SpatialTransformerConfig::new(3).init(device))
            .transpose()?;
        let stn64 = self
            .feature_transform
            .then(|| SpatialTransformerConfig::new(POINT_FEATURE_DIM).init(device))
            .transpose()?;

        let pw_mlp = MlpConfig::new(3, POINT_FEATURE_DIM)
            .with_hidden_dims(vec![64])
            .with_final_activation(true)
            .init(device);

        let pw_mlp2 = MlpConfig::new(POINT_FEATURE_DIM, GLOBAL_FEATURE_DIM)
            .with_hidden_dims(vec![64, 128])
            .with_final_activation(true)
            .init(device);

        Ok(PointNetFeat {
            stn3,
            stn64,
            pw_mlp,
            pw_mlp2,
        })
    }
}

impl<B: Backend> PointNetFeat<B> {
    /// Whether the 3x3 input alignment is applied.
    pub fn has_input_transform(&self) -> bool {
        self.stn3.is_some()
    }

    /// Whether the 64x64 feature alignment is applied.
    pub fn has_feature_transform(&self) -> bool {
        self.stn64.is_some()
    }

    /// Forward pass.
    ///
    /// Input: points tensor of shape [batch, num_points, 3]
    /// Output: global feature of shape [batch, 1024]
    pub fn forward(&self, points: Tensor<B, 3>) -> Tensor<B, 2> {
        self.forward_detailed(points).global
    }

    /// Forward pass with the input shape checked first.
    pub fn try_forward(&self, points: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        validate_point_cloud(&points)?;
        Ok(self.forward(points))
    }

    /// Forward pass keeping per-point features and the predicted transforms.
    pub fn forward_detailed(&self, points: Tensor<B, 3>) -> FeatOutput<B> {
        log::debug!("pointnet feat input: {:?}", points.dims());

        let (points, input_transform) = match &self.stn3 {
            Some(stn) => {
                let (aligned, transform) = stn.align(points);
                (aligned, Some(transform))
            }
            None => (points, None),
        };

        log::debug!("pointnet feat aligned input: {:?}", points.dims());

        let features = self.embed_points(points);

        let (point_features, feature_transform) = match &self.stn64 {
            Some(stn) => {
                let (aligned, transform) = stn.align(features);
                (aligned, Some(transform))
            }
            None => (features, None),
        };

        let global = self.pool_features(point_features.clone());

        log::debug!("pointnet feat global: {:?}", global.dims());

        FeatOutput {
            global,
            point_features,
            input_transform,
            feature_transform,
        }
    }

    /// Shared per-point embedding: [batch, num_points, 3] -> [batch, num_points, 64]
    pub(crate) fn embed_points(&self, points: Tensor<B, 3>) -> Tensor<B, 3> {
        self.pw_mlp.forward_3d(points)
    }

    /// Second shared MLP followed by max pooling over points:
    /// [batch, num_points, 64] -> [batch, 1024]
    pub(crate) fn pool_features(&self, features: Tensor<B, 3>) -> Tensor<B, 2> {
        self.pw_mlp2.forward_3d(features).max_dim(1).squeeze(1)
    }
}
