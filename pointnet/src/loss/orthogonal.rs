//! Orthogonality regularization for predicted transforms.

use burn::prelude::*;

use crate::nn::identity_matrix;

/// Default weight of the orthogonality regularizer.
pub const DEFAULT_ORTHOGONAL_WEIGHT: f32 = 1e-3;

/// Added under the square root so the norm's gradient stays finite at zero.
const NORM_EPSILON: f32 = 1e-12;

/// Soft orthogonality constraint on `[batch, k, k]` transforms.
///
/// A rotation `A` satisfies `A * A^T = I`; the loss is
/// `weight * mean_b ||I - M_b * M_b^T||_F`.
#[derive(Debug, Clone, Copy)]
pub struct OrthogonalLoss {
    /// Weight for the regularization term.
    weight: f32,
}

impl Default for OrthogonalLoss {
    fn default() -> Self {
        Self::new(DEFAULT_ORTHOGONAL_WEIGHT)
    }
}

impl OrthogonalLoss {
    /// Create a new orthogonality loss.
    pub fn new(weight: f32) -> Self {
        Self { weight }
    }

    /// Weight of the term.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Compute the loss for an optional transform.
    ///
    /// `None` (alignment disabled) gives an exact zero on `device`.
    ///
    /// Output: scalar loss of shape [1]
    pub fn forward<B: Backend>(
        &self,
        transform: Option<Tensor<B, 3>>,
        device: &B::Device,
    ) -> Tensor<B, 1> {
        match transform {
            Some(transform) => self.matrix_loss(transform),
            None => Tensor::zeros([1], device),
        }
    }

    /// Compute the loss for a batch of transforms: [batch, k, k]
    pub fn matrix_loss<B: Backend>(&self, transform: Tensor<B, 3>) -> Tensor<B, 1> {
        let [batch, k, _] = transform.dims();
        let device = transform.device();

        let identity = identity_matrix::<B>(k, &device)
            .unsqueeze::<3>()
            .repeat_dim(0, batch);
        let square = transform.clone().matmul(transform.swap_dims(1, 2));

        // Frobenius norm per batch element: [batch, 1]
        let diff = (identity - square).reshape([batch, k * k]);
        let norm = (diff.clone() * diff)
            .sum_dim(1)
            .add_scalar(NORM_EPSILON)
            .sqrt();

        norm.mean() * self.weight
    }
}

/// Orthogonality loss with the default weight; zero when `transform` is `None`.
pub fn orthogonal_loss<B: Backend>(
    transform: Option<Tensor<B, 3>>,
    device: &B::Device,
) -> Tensor<B, 1> {
    OrthogonalLoss::default().forward(transform, device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar()
    }

    #[test]
    fn test_none_is_exact_zero() {
        let device = Default::default();
        let loss = orthogonal_loss::<TestBackend>(None, &device);

        assert_eq!(loss.dims(), [1]);
        assert_eq!(scalar(loss), 0.0);
    }

    #[test]
    fn test_identity_is_zero() {
        let device = Default::default();
        let eye = identity_matrix::<TestBackend>(4, &device)
            .unsqueeze::<3>()
            .repeat_dim(0, 5);

        let val = scalar(orthogonal_loss(Some(eye), &device));
        assert!(val.abs() < 1e-6, "Expected zero, got {}", val);
    }

    #[test]
    fn test_gradient_is_finite_at_identity() {
        type AutodiffBackend = burn::backend::Autodiff<TestBackend>;

        let device = Default::default();
        let eye = identity_matrix::<AutodiffBackend>(3, &device)
            .unsqueeze::<3>()
            .repeat_dim(0, 2)
            .require_grad();

        let loss = OrthogonalLoss::new(1.0).matrix_loss(eye.clone());
        let grads = loss.backward();

        let grad: Vec<f32> = eye.grad(&grads).unwrap().into_data().to_vec().unwrap();
        assert!(grad.iter().all(|g| g.is_finite()), "gradient: {:?}", grad);
        assert!(grad.iter().all(|g| g.abs() < 1e-3), "gradient: {:?}", grad);
    }

    #[test]
    fn test_scaled_identity() {
        let device = Default::default();
        // M = 2I: I - 4I = -3I, ||.||_F = 3 * sqrt(3)
        let m = identity_matrix::<TestBackend>(3, &device).mul_scalar(2.0).unsqueeze::<3>();

        let val = scalar(OrthogonalLoss::new(1.0).matrix_loss(m));
        let expected = 3.0 * 3.0f32.sqrt();
        assert!((val - expected).abs() < 1e-4, "Expected {}, got {}", expected, val);
    }

    #[test]
    fn test_weight_scales_loss() {
        let device = Default::default();
        let m = Tensor::<TestBackend, 3>::zeros([2, 3, 3], &device);

        // M = 0: ||I||_F = sqrt(3)
        let unit = scalar(OrthogonalLoss::new(1.0).matrix_loss(m.clone()));
        let weighted = scalar(OrthogonalLoss::default().matrix_loss(m));

        assert!((unit - 3.0f32.sqrt()).abs() < 1e-5);
        assert!((weighted - unit * DEFAULT_ORTHOGONAL_WEIGHT).abs() < 1e-7);
    }
}
