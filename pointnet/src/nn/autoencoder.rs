//! Point cloud autoencoder.

use burn::module::Module;
use burn::nn::{BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::config::{PointNetAutoEncoderConfig, PointNetFeatConfig, GLOBAL_FEATURE_DIM};
use crate::error::{PointNetError, Result};

use super::feat::PointNetFeat;
use super::validate_point_cloud;

/// MLP decoder: global feature -> point cloud.
///
/// 1024 -> N/4 -> N/2 -> N -> 3N, widths rounded down.
#[derive(Module, Debug)]
pub struct PointCloudDecoder<B: Backend> {
    fc1: Linear<B>,
    bn1: BatchNorm<B, 0>,
    fc2: Linear<B>,
    bn2: BatchNorm<B, 0>,
    fc3: Linear<B>,
    dropout: Dropout,
    bn3: BatchNorm<B, 0>,
    fc4: Linear<B>,
    activation: Relu,
    #[module(skip)]
    num_points: usize,
}

impl<B: Backend> PointCloudDecoder<B> {
    fn new(config: &PointNetAutoEncoderConfig, device: &B::Device) -> Self {
        let [quarter, half, full] = config.decoder_widths();

        Self {
            fc1: LinearConfig::new(GLOBAL_FEATURE_DIM, quarter).init(device),
            bn1: BatchNormConfig::new(quarter).init(device),
            fc2: LinearConfig::new(quarter, half).init(device),
            bn2: BatchNormConfig::new(half).init(device),
            fc3: LinearConfig::new(half, full).init(device),
            dropout: DropoutConfig::new(config.dropout).init(),
            bn3: BatchNormConfig::new(full).init(device),
            fc4: LinearConfig::new(full, full * 3).init(device),
            activation: Relu::new(),
            num_points: config.num_points,
        }
    }

    /// latent: [batch, 1024] -> point cloud: [batch, num_points, 3]
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 3> {
        let x = self.activation.forward(self.bn1.forward(self.fc1.forward(latent)));
        let x = self.activation.forward(self.bn2.forward(self.fc2.forward(x)));

        let x = self.dropout.forward(self.fc3.forward(x));
        let x = self.activation.forward(self.bn3.forward(x));

        let x = self.fc4.forward(x);
        let [batch, _] = x.dims();
        x.reshape([batch, self.num_points, 3])
    }
}

/// PointNet autoencoder.
///
/// Encodes a cloud into the global feature (no alignment transforms) and
/// decodes a cloud of the same, fixed size.
#[derive(Module, Debug)]
pub struct PointNetAutoEncoder<B: Backend> {
    pointnet_feat: PointNetFeat<B>,
    decoder: PointCloudDecoder<B>,
}

impl PointNetAutoEncoderConfig {
    /// Initialize the autoencoder.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PointNetAutoEncoder<B>> {
        self.validate()?;

        let model = PointNetAutoEncoder {
            pointnet_feat: PointNetFeatConfig::new().init(device)?,
            decoder: PointCloudDecoder::new(self, device),
        };

        log::info!(
            "PointNetAutoEncoder: {} points, decoder widths {:?}, {} parameters",
            self.num_points,
            self.decoder_widths(),
            model.num_params()
        );

        Ok(model)
    }
}

impl<B: Backend> PointNetAutoEncoder<B> {
    /// Number of points the decoder produces.
    pub fn num_points(&self) -> usize {
        self.decoder.num_points
    }

    /// Encode: [batch, num_points, 3] -> [batch, 1024]
    pub fn encode(&self, points: Tensor<B, 3>) -> Tensor<B, 2> {
        self.pointnet_feat.forward(points)
    }

    /// Decode: [batch, 1024] -> [batch, num_points, 3]
    pub fn decode(&self, latent: Tensor<B, 2>) -> Tensor<B, 3> {
        self.decoder.forward(latent)
    }

    /// Forward pass.
    ///
    /// Input: [batch, num_points, 3]
    /// Output: reconstruction [batch, num_points, 3]
    pub fn forward(&self, points: Tensor<B, 3>) -> Tensor<B, 3> {
        self.decode(self.encode(points))
    }

    /// Forward pass with the input checked against `[batch, num_points, 3]`.
    pub fn try_forward(&self, points: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        validate_point_cloud(&points)?;

        let [batch, num_points, _] = points.dims();
        if num_points != self.num_points() {
            return Err(PointNetError::ShapeMismatch {
                expected: vec![batch, self.num_points(), 3],
                got: vec![batch, num_points, 3],
            });
        }

        Ok(self.forward(points))
    }
}
