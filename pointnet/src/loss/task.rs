//! Task losses for the three PointNet heads.

use burn::nn::loss::CrossEntropyLossConfig;
use burn::prelude::*;

use crate::config::PointNetLossConfig;
use crate::error::Result;
use crate::nn::{ClsOutput, SegOutput};

use super::orthogonal::OrthogonalLoss;

/// A total loss with its components kept apart for logging.
#[derive(Debug, Clone)]
pub struct LossOutput<B: Backend> {
    /// `task + regularization`; call `backward` on this.
    pub total: Tensor<B, 1>,
    /// Cross-entropy term.
    pub task: Tensor<B, 1>,
    /// Orthogonality terms summed over every predicted transform.
    pub regularization: Tensor<B, 1>,
}

/// Loss calculator for PointNet training.
///
/// Adds the orthogonality regularizer for every transform the forward pass
/// produced to the task loss.
#[derive(Debug, Clone)]
pub struct PointNetLoss {
    orthogonal: OrthogonalLoss,
}

impl Default for PointNetLoss {
    fn default() -> Self {
        Self {
            orthogonal: OrthogonalLoss::default(),
        }
    }
}

impl PointNetLoss {
    /// Create a new loss calculator from a validated configuration.
    pub fn new(config: PointNetLossConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            orthogonal: OrthogonalLoss::new(config.orthogonal_weight),
        })
    }

    /// Classification loss.
    ///
    /// Inputs:
    /// - output: logits [batch, num_classes] and transforms
    /// - targets: class indices [batch]
    pub fn classification<B: Backend>(
        &self,
        output: &ClsOutput<B>,
        targets: Tensor<B, 1, Int>,
    ) -> LossOutput<B> {
        let task = cross_entropy(output.logits.clone(), targets);
        let regularization = self.regularize(
            [&output.input_transform, &output.feature_transform],
            &output.logits.device(),
        );

        LossOutput {
            total: task.clone() + regularization.clone(),
            task,
            regularization,
        }
    }

    /// Per-point segmentation loss.
    ///
    /// Inputs:
    /// - output: logits [batch, num_parts, num_points] and transforms
    /// - targets: part indices [batch, num_points]
    pub fn segmentation<B: Backend>(
        &self,
        output: &SegOutput<B>,
        targets: Tensor<B, 2, Int>,
    ) -> LossOutput<B> {
        let [batch, num_parts, num_points] = output.logits.dims();

        // [batch * num_points, num_parts]
        let logits = output
            .logits
            .clone()
            .permute([0, 2, 1])
            .reshape([batch * num_points, num_parts]);
        let task = cross_entropy(logits, targets.reshape([batch * num_points]));

        let regularization = self.orthogonal.matrix_loss(output.input_transform.clone())
            + self.orthogonal.matrix_loss(output.feature_transform.clone());

        LossOutput {
            total: task.clone() + regularization.clone(),
            task,
            regularization,
        }
    }

    /// Reconstruction loss for the autoencoder.
    ///
    /// Symmetric Chamfer distance between `original` [batch, N, 3] and
    /// `reconstructed` [batch, M, 3].
    pub fn reconstruction<B: Backend>(
        &self,
        original: Tensor<B, 3>,
        reconstructed: Tensor<B, 3>,
    ) -> Tensor<B, 1> {
        chamfer_distance(original, reconstructed)
    }

    fn regularize<B: Backend>(
        &self,
        transforms: [&Option<Tensor<B, 3>>; 2],
        device: &B::Device,
    ) -> Tensor<B, 1> {
        transforms
            .into_iter()
            .fold(Tensor::zeros([1], device), |acc, transform| {
                acc + self.orthogonal.forward(transform.clone(), device)
            })
    }
}

fn cross_entropy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let device = logits.device();
    CrossEntropyLossConfig::new()
        .init(&device)
        .forward(logits, targets)
}

/// Symmetric Chamfer distance on squared Euclidean distances.
///
/// points1: [B, N, 3], points2: [B, M, 3] -> scalar
pub fn chamfer_distance<B: Backend>(points1: Tensor<B, 3>, points2: Tensor<B, 3>) -> Tensor<B, 1> {
    // [B, N, M]
    let distances = pairwise_squared_distances(points1, points2);

    // For each point in points1, the nearest in points2: [B, N]
    let forward = distances.clone().min_dim(2).mean();
    // For each point in points2, the nearest in points1: [B, M]
    let backward = distances.min_dim(1).mean();

    forward + backward
}

/// points1: [B, N, 3], points2: [B, M, 3] -> [B, N, M]
fn pairwise_squared_distances<B: Backend>(
    points1: Tensor<B, 3>,
    points2: Tensor<B, 3>,
) -> Tensor<B, 3> {
    let [_, n, _] = points1.dims();
    let [_, m, _] = points2.dims();

    let p1: Tensor<B, 4> = points1.unsqueeze_dim(2); // [B, N, 1, 3]
    let p2: Tensor<B, 4> = points2.unsqueeze_dim(1); // [B, 1, M, 3]

    let diff = p1.repeat_dim(2, m) - p2.repeat_dim(1, n); // [B, N, M, 3]
    (diff.clone() * diff).sum_dim(3).squeeze(3)
}
