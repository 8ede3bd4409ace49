//! Classification head.

use burn::module::Module;
use burn::prelude::*;

use crate::config::{PointNetClsConfig, GLOBAL_FEATURE_DIM};
use crate::error::Result;

use super::feat::PointNetFeat;
use super::mlp::{Mlp, MlpConfig};
use super::validate_point_cloud;

/// Logits together with the transforms that produced them.
#[derive(Debug, Clone)]
pub struct ClsOutput<B: Backend> {
    /// Class logits: [batch, num_classes]
    pub logits: Tensor<B, 2>,
    /// Input alignment: [batch, 3, 3], if enabled.
    pub input_transform: Option<Tensor<B, 3>>,
    /// Feature alignment: [batch, 64, 64], if enabled.
    pub feature_transform: Option<Tensor<B, 3>>,
}

/// PointNet classification network.
#[derive(Module, Debug)]
pub struct PointNetCls<B: Backend> {
    /// Extracts max-pooled features.
    pointnet_feat: PointNetFeat<B>,
    /// 1024 -> 512 -> 256 -> dropout -> num_classes.
    classify: Mlp<B>,
    #[module(skip)]
    num_classes: usize,
}

impl PointNetClsConfig {
    /// Initialize the classification network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PointNetCls<B>> {
        self.validate()?;

        let classify = MlpConfig::new(GLOBAL_FEATURE_DIM, self.num_classes)
            .with_hidden_dims(vec![512, 256])
            .with_dropout(self.dropout)
            .init(device);

        let model = PointNetCls {
            pointnet_feat: self.feat().init(device)?,
            classify,
            num_classes: self.num_classes,
        };

        log::info!(
            "PointNetCls: {} classes, input_transform={}, feature_transform={}, {} parameters",
            self.num_classes,
            self.input_transform,
            self.feature_transform,
            model.num_params()
        );

        Ok(model)
    }
}

impl<B: Backend> PointNetCls<B> {
    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// The embedded feature extractor.
    pub fn feat(&self) -> &PointNetFeat<B> {
        &self.pointnet_feat
    }

    /// Forward pass.
    ///
    /// Input: [batch, num_points, 3]
    /// Output: logits [batch, num_classes]
    pub fn forward(&self, points: Tensor<B, 3>) -> Tensor<B, 2> {
        self.forward_with_transforms(points).logits
    }

    /// Forward pass with the input shape checked first.
    pub fn try_forward(&self, points: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        validate_point_cloud(&points)?;
        Ok(self.forward(points))
    }

    /// Forward pass keeping the predicted transforms for regularization.
    pub fn forward_with_transforms(&self, points: Tensor<B, 3>) -> ClsOutput<B> {
        let feat = self.pointnet_feat.forward_detailed(points);
        let logits = self.classify.forward(feat.global);

        ClsOutput {
            logits,
            input_transform: feat.input_transform,
            feature_transform: feat.feature_transform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_cls_forward() {
        let device = Default::default();
        let model = PointNetClsConfig::new(10)
            .init::<TestBackend>(&device)
            .unwrap();

        let logits = model.forward(Tensor::zeros([3, 64, 3], &device));

        assert_eq!(logits.dims(), [3, 10]);
        assert_eq!(model.num_classes(), 10);
    }

    #[test]
    fn test_cls_forward_with_transforms() {
        let device = Default::default();
        let model = PointNetClsConfig::new(4)
            .with_input_transform(true)
            .init::<TestBackend>(&device)
            .unwrap();

        let output = model.forward_with_transforms(Tensor::ones([2, 32, 3], &device));

        assert_eq!(output.logits.dims(), [2, 4]);
        assert_eq!(output.input_transform.map(|t| t.dims()), Some([2, 3, 3]));
        assert!(output.feature_transform.is_none());
    }

    #[test]
    fn test_cls_init_rejects_zero_classes() {
        let device = Default::default();
        assert!(PointNetClsConfig::new(0).init::<TestBackend>(&device).is_err());
    }
}
