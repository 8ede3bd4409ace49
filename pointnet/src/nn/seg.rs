//! Part segmentation head.

use burn::module::Module;
use burn::prelude::*;

use crate::config::{
    PointNetFeatConfig, PointNetPartSegConfig, SpatialTransformerConfig, GLOBAL_FEATURE_DIM,
    POINT_FEATURE_DIM,
};
use crate::error::Result;

use super::feat::PointNetFeat;
use super::mlp::{Mlp, MlpConfig};
use super::stn::SpatialTransformer;
use super::validate_point_cloud;

/// Per-point logits together with both alignment transforms.
#[derive(Debug, Clone)]
pub struct SegOutput<B: Backend> {
    /// Part logits: [batch, num_parts, num_points]
    pub logits: Tensor<B, 3>,
    /// Input alignment: [batch, 3, 3]
    pub input_transform: Tensor<B, 3>,
    /// Feature alignment: [batch, 64, 64]
    pub feature_transform: Tensor<B, 3>,
}

/// PointNet part segmentation network.
///
/// Each point is labelled from its own 64-dim feature concatenated with the
/// global descriptor of the whole cloud (1088 values per point). Both
/// alignment transforms are always applied.
#[derive(Module, Debug)]
pub struct PointNetPartSeg<B: Backend> {
    /// 3x3 input alignment.
    stn3: SpatialTransformer<B>,
    /// 64x64 feature alignment.
    stn64: SpatialTransformer<B>,
    /// Shared point embedding and pooling; its own alignments are disabled.
    pointnet_feat: PointNetFeat<B>,
    /// Shared per-point MLP 1088 -> 512 -> 256 -> 128 -> num_parts.
    seg_mlp: Mlp<B>,
    #[module(skip)]
    num_parts: usize,
}

impl PointNetPartSegConfig {
    /// Initialize the part segmentation network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PointNetPartSeg<B>> {
        self.validate()?;

        let stn3 = SpatialTransformerConfig::new(3).init(device)?;
        let stn64 = SpatialTransformerConfig::new(POINT_FEATURE_DIM).init(device)?;
        let pointnet_feat = PointNetFeatConfig::new().init(device)?;

        let seg_mlp = MlpConfig::new(POINT_FEATURE_DIM + GLOBAL_FEATURE_DIM, self.num_parts)
            .with_hidden_dims(vec![512, 256, 128])
            .init(device);

        let model = PointNetPartSeg {
            stn3,
            stn64,
            pointnet_feat,
            seg_mlp,
            num_parts: self.num_parts,
        };

        log::info!(
            "PointNetPartSeg: {} parts, {} parameters",
            self.num_parts,
            model.num_params()
        );

        Ok(model)
    }
}

impl<B: Backend> PointNetPartSeg<B> {
    /// Number of part labels.
    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    /// Forward pass.
    ///
    /// Input: [batch, num_points, 3]
    /// Output: logits [batch, num_parts, num_points]
    pub fn forward(&self, points: Tensor<B, 3>) -> Tensor<B, 3> {
        self.forward_with_transforms(points).logits
    }

    /// Forward pass with the input shape checked first.
    pub fn try_forward(&self, points: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        validate_point_cloud(&points)?;
        Ok(self.forward(points))
    }

    /// Forward pass keeping both transforms for regularization.
    pub fn forward_with_transforms(&self, points: Tensor<B, 3>) -> SegOutput<B> {
        let [_, num_points, _] = points.dims();

        let (points, input_transform) = self.stn3.align(points);

        // [batch, num_points, 64]
        let features = self.pointnet_feat.embed_points(points);
        let (features, feature_transform) = self.stn64.align(features);

        // [batch, 1024]
        let global = self.pointnet_feat.pool_features(features.clone());

        log::debug!(
            "pointnet seg point features: {:?}, global: {:?}",
            features.dims(),
            global.dims()
        );

        // [batch, num_points, 1024]
        let global: Tensor<B, 3> = global.unsqueeze_dim(1);
        let global = global.repeat_dim(1, num_points);

        // [batch, num_points, 1088]
        let concat = Tensor::cat(vec![features, global], 2);

        // [batch, num_points, num_parts] -> [batch, num_parts, num_points]
        let logits = self.seg_mlp.forward_3d(concat).permute([0, 2, 1]);

        SegOutput {
            logits,
            input_transform,
            feature_transform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_seg_forward() {
        let device = Default::default();
        let model = PointNetPartSegConfig::new()
            .with_num_parts(6)
            .init::<TestBackend>(&device)
            .unwrap();

        let output = model.forward_with_transforms(Tensor::ones([2, 20, 3], &device));

        assert_eq!(output.logits.dims(), [2, 6, 20]);
        assert_eq!(output.input_transform.dims(), [2, 3, 3]);
        assert_eq!(output.feature_transform.dims(), [2, 64, 64]);
    }

    #[test]
    fn test_seg_default_parts() {
        let device = Default::default();
        let model = PointNetPartSegConfig::new()
            .init::<TestBackend>(&device)
            .unwrap();

        assert_eq!(model.num_parts(), 50);
        assert_eq!(model.forward(Tensor::zeros([1, 8, 3], &device)).dims(), [1, 50, 8]);
    }
}
