//! Loss configuration types.

use burn::config::Config;

use crate::error::PointNetError;
use crate::loss::DEFAULT_ORTHOGONAL_WEIGHT;

/// Configuration for the PointNet training losses.
#[derive(Config, Debug)]
pub struct PointNetLossConfig {
    /// Weight of the orthogonality regularizer on every predicted transform.
    #[config(default = "DEFAULT_ORTHOGONAL_WEIGHT")]
    pub orthogonal_weight: f32,
}

impl Default for PointNetLossConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PointNetLossConfig {
    /// Disable the orthogonality regularizer.
    pub fn without_regularization() -> Self {
        Self::new().with_orthogonal_weight(0.0)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.orthogonal_weight.is_finite() || self.orthogonal_weight < 0.0 {
            return Err(PointNetError::invalid_config(
                "orthogonal_weight must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
