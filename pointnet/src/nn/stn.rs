//! Spatial transformer (T-Net) predicting an alignment matrix.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::config::{SpatialTransformerConfig, GLOBAL_FEATURE_DIM};
use crate::error::{PointNetError, Result};

use super::mlp::{Mlp, MlpConfig};

/// Convolutional block: 1x1 Conv1d + BatchNorm + ReLU, applied per position.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv1d<B>,
    norm: BatchNorm<B, 1>,
    activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv1dConfig::new(in_channels, out_channels, 1).init(device),
            norm: BatchNormConfig::new(out_channels).init(device),
            activation: Relu::new(),
        }
    }

    fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        self.activation.forward(x)
    }
}

/// Learns a `k x k` matrix that starts out near the identity.
///
/// The flattened identity is added to the raw network output, so an
/// untrained transformer is biased toward leaving its input unchanged.
/// Orthogonality is not enforced here; see [`crate::loss::orthogonal_loss`].
#[derive(Module, Debug)]
pub struct SpatialTransformer<B: Backend> {
    /// Per-position channel expansion k -> 64 -> 128 -> 1024.
    convs: Vec<ConvBlock<B>>,
    /// 1024 -> 512 -> 256 with normalization and activation.
    fc: Mlp<B>,
    /// 256 -> k * k raw values.
    head: Linear<B>,
    #[module(skip)]
    k: usize,
}

impl SpatialTransformerConfig {
    /// Initialize the spatial transformer.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SpatialTransformer<B>> {
        self.validate()?;

        let k = self.k;
        let convs = vec![
            ConvBlock::new(k, 64, device),
            ConvBlock::new(64, 128, device),
            ConvBlock::new(128, GLOBAL_FEATURE_DIM, device),
        ];

        let fc = MlpConfig::new(GLOBAL_FEATURE_DIM, 256)
            .with_hidden_dims(vec![512])
            .with_final_activation(true)
            .init(device);

        let mut head = LinearConfig::new(256, k * k);
        if self.identity_init {
            head = head.with_initializer(Initializer::Zeros);
        }

        Ok(SpatialTransformer {
            convs,
            fc,
            head: head.init(device),
            k,
        })
    }
}

impl<B: Backend> SpatialTransformer<B> {
    /// Side of the predicted matrix.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Forward pass.
    ///
    /// Input: [batch, k, num_points]
    /// Output: [batch, k, k]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let device = x.device();
        let [batch, _, _] = x.dims();
        let k = self.k;

        let mut x = x;
        for conv in &self.convs {
            x = conv.forward(x);
        }

        // Max over positions: [batch, 1024]
        let x: Tensor<B, 2> = x.max_dim(2).squeeze(2);

        let x = self.head.forward(self.fc.forward(x));

        let identity = identity_matrix::<B>(k, &device)
            .reshape([1, k * k])
            .repeat_dim(0, batch);

        (x + identity).reshape([batch, k, k])
    }

    /// Align row vectors: `x [batch, num_points, k]` times the predicted transform.
    ///
    /// Returns the aligned tensor (same shape) and the transform `[batch, k, k]`.
    pub fn align(&self, x: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        let transform = self.forward(x.clone().swap_dims(1, 2));
        (x.matmul(transform.clone()), transform)
    }

    /// Forward pass with the input checked against `[batch >= 1, k, num_points >= 1]`.
    pub fn try_forward(&self, x: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let [batch, channels, num_points] = x.dims();
        if batch == 0 || channels != self.k || num_points == 0 {
            return Err(PointNetError::ShapeMismatch {
                expected: vec![0, self.k, 0],
                got: vec![batch, channels, num_points],
            });
        }
        Ok(self.forward(x))
    }
}

/// `k x k` identity matrix.
pub(crate) fn identity_matrix<B: Backend>(k: usize, device: &B::Device) -> Tensor<B, 2> {
    let mut values = vec![0.0f32; k * k];
    for i in 0..k {
        values[i * k + i] = 1.0;
    }
    Tensor::from_data(TensorData::new(values, [k, k]), device)
}
