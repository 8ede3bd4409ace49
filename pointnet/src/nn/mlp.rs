//! Shared MLP building blocks.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Configuration for an MLP of `Linear -> BatchNorm -> ReLU` blocks.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input dimension.
    pub input_dim: usize,
    /// Output dimension.
    pub output_dim: usize,
    /// Hidden layer dimensions.
    #[config(default = "vec![]")]
    pub hidden_dims: Vec<usize>,
    /// Dropout probability, applied once right before the output layer.
    #[config(default = 0.0)]
    pub dropout: f64,
    /// Whether the output layer is also followed by normalization and activation.
    #[config(default = false)]
    pub final_activation: bool,
}

impl MlpConfig {
    /// Initialize the MLP.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut layers = Vec::with_capacity(self.hidden_dims.len());
        let mut in_dim = self.input_dim;

        for &out_dim in &self.hidden_dims {
            layers.push(LinearBlock::new(in_dim, out_dim, true, device));
            in_dim = out_dim;
        }

        let output = LinearBlock::new(in_dim, self.output_dim, self.final_activation, device);

        let dropout = if self.dropout > 0.0 {
            Some(DropoutConfig::new(self.dropout).init())
        } else {
            None
        };

        Mlp {
            layers,
            output,
            activation: Relu::new(),
            dropout,
            final_activation: self.final_activation,
        }
    }
}

/// A linear layer with optional batch normalization over its output features.
#[derive(Module, Debug)]
pub struct LinearBlock<B: Backend> {
    linear: Linear<B>,
    norm: Option<BatchNorm<B, 0>>,
}

impl<B: Backend> LinearBlock<B> {
    fn new(in_dim: usize, out_dim: usize, batch_norm: bool, device: &B::Device) -> Self {
        Self {
            linear: LinearConfig::new(in_dim, out_dim).init(device),
            norm: batch_norm.then(|| BatchNormConfig::new(out_dim).init(device)),
        }
    }

    /// `[rows, in] -> [rows, out]`, normalized when configured.
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(x);
        match &self.norm {
            Some(norm) => norm.forward(x),
            None => x,
        }
    }

    /// Output width, the second dimension of the `[in, out]` weight.
    pub fn output_dim(&self) -> usize {
        self.linear.weight.dims()[1]
    }
}

/// Multi-Layer Perceptron module.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    /// Hidden layers.
    layers: Vec<LinearBlock<B>>,
    /// Output layer.
    output: LinearBlock<B>,
    /// Activation function.
    activation: Relu,
    /// Optional dropout before the output layer.
    dropout: Option<Dropout>,
    /// Whether to apply activation to final layer.
    #[module(skip)]
    final_activation: bool,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass.
    ///
    /// Input shape: [rows, input_dim]
    /// Output shape: [rows, output_dim]
    pub fn forward(&self, mut x: Tensor<B, 2>) -> Tensor<B, 2> {
        for layer in &self.layers {
            x = layer.forward(x);
            x = self.activation.forward(x);
        }

        if let Some(ref dropout) = self.dropout {
            x = dropout.forward(x);
        }

        x = self.output.forward(x);

        if self.final_activation {
            x = self.activation.forward(x);
        }

        x
    }

    /// Shared per-point forward pass.
    ///
    /// Every point goes through the same weights, so the result does not
    /// depend on point order or count.
    ///
    /// Input shape: [batch, num_points, input_dim]
    /// Output shape: [batch, num_points, output_dim]
    pub fn forward_3d(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, num_points, input_dim] = x.dims();

        let x_flat = x.reshape([batch * num_points, input_dim]);
        let y_flat = self.forward(x_flat);

        y_flat.reshape([batch, num_points, self.output_dim()])
    }

    /// Output width.
    pub fn output_dim(&self) -> usize {
        self.output.output_dim()
    }
}
