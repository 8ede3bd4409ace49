//! Network configuration types.

use burn::config::Config;

use crate::error::PointNetError;

/// Width of the pooled global descriptor.
pub const GLOBAL_FEATURE_DIM: usize = 1024;

/// Width of the per-point features kept for segmentation.
pub const POINT_FEATURE_DIM: usize = 64;

/// Configuration for a spatial transformer (T-Net) predicting a `k x k` matrix.
#[derive(Config, Debug)]
pub struct SpatialTransformerConfig {
    /// Side of the predicted matrix; also the input channel count.
    pub k: usize,

    /// Zero the output layer so an untrained transformer returns the identity.
    #[config(default = false)]
    pub identity_init: bool,
}

impl SpatialTransformerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.k == 0 {
            return Err(PointNetError::invalid_config("k must be positive"));
        }
        Ok(())
    }
}

/// Configuration for the max-pooled feature extractor.
///
/// Both switches are fixed when the module is built.
#[derive(Config, Debug)]
pub struct PointNetFeatConfig {
    /// Align the input cloud with a learned 3x3 transform.
    #[config(default = false)]
    pub input_transform: bool,

    /// Align the 64-dim per-point features with a learned 64x64 transform.
    #[config(default = false)]
    pub feature_transform: bool,
}

/// Configuration for the classification network.
#[derive(Config, Debug)]
pub struct PointNetClsConfig {
    /// Number of output classes.
    pub num_classes: usize,

    /// See [`PointNetFeatConfig::input_transform`].
    #[config(default = false)]
    pub input_transform: bool,

    /// See [`PointNetFeatConfig::feature_transform`].
    #[config(default = false)]
    pub feature_transform: bool,

    /// Dropout probability before the final layer.
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl PointNetClsConfig {
    /// Configuration of the embedded feature extractor.
    pub fn feat(&self) -> PointNetFeatConfig {
        PointNetFeatConfig::new()
            .with_input_transform(self.input_transform)
            .with_feature_transform(self.feature_transform)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.num_classes == 0 {
            return Err(PointNetError::invalid_config("num_classes must be positive"));
        }
        validate_dropout(self.dropout)
    }
}

/// Configuration for the part segmentation network.
#[derive(Config, Debug)]
pub struct PointNetPartSegConfig {
    /// Number of part labels.
    #[config(default = 50)]
    pub num_parts: usize,
}

impl PointNetPartSegConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.num_parts == 0 {
            return Err(PointNetError::invalid_config("num_parts must be positive"));
        }
        Ok(())
    }
}

/// Configuration for the point cloud autoencoder.
#[derive(Config, Debug)]
pub struct PointNetAutoEncoderConfig {
    /// Number of points in every input and reconstructed cloud.
    pub num_points: usize,

    /// Dropout probability in the last hidden decoder layer.
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl PointNetAutoEncoderConfig {
    /// Hidden decoder widths: `num_points / 4`, `num_points / 2`, `num_points`.
    ///
    /// Floor division; [`validate`](Self::validate) guarantees every width is
    /// at least 1.
    pub fn decoder_widths(&self) -> [usize; 3] {
        [self.num_points / 4, self.num_points / 2, self.num_points]
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.num_points < 4 {
            return Err(PointNetError::invalid_config(format!(
                "num_points must be at least 4, got {}",
                self.num_points
            )));
        }
        validate_dropout(self.dropout)
    }
}

fn validate_dropout(prob: f64) -> crate::error::Result<()> {
    if !(0.0..1.0).contains(&prob) {
        return Err(PointNetError::invalid_config(format!(
            "dropout must be in [0, 1), got {prob}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cls_config_defaults() {
        let config = PointNetClsConfig::new(16);
        assert_eq!(config.num_classes, 16);
        assert!(!config.input_transform);
        assert!(!config.feature_transform);
        assert_eq!(config.dropout, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cls_config_rejects_zero_classes() {
        let config = PointNetClsConfig::new(0);
        assert!(matches!(
            config.validate(),
            Err(PointNetError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_cls_config_rejects_bad_dropout() {
        assert!(PointNetClsConfig::new(4).with_dropout(1.0).validate().is_err());
        assert!(PointNetClsConfig::new(4).with_dropout(-0.1).validate().is_err());
    }

    #[test]
    fn test_feat_config_follows_cls_flags() {
        let feat = PointNetClsConfig::new(4).with_input_transform(true).feat();
        assert!(feat.input_transform);
        assert!(!feat.feature_transform);
    }

    #[test]
    fn test_part_seg_default_parts() {
        assert_eq!(PointNetPartSegConfig::new().num_parts, 50);
    }

    #[test]
    fn test_autoencoder_widths_floor() {
        assert_eq!(
            PointNetAutoEncoderConfig::new(1024).decoder_widths(),
            [256, 512, 1024]
        );
        // Not divisible by 4: floor division.
        assert_eq!(PointNetAutoEncoderConfig::new(10).decoder_widths(), [2, 5, 10]);
    }

    #[test]
    fn test_autoencoder_rejects_tiny_clouds() {
        assert!(PointNetAutoEncoderConfig::new(3).validate().is_err());
        assert!(PointNetAutoEncoderConfig::new(4).validate().is_ok());
    }

    #[test]
    fn test_stn_rejects_zero_k() {
        assert!(SpatialTransformerConfig::new(0).validate().is_err());
        assert!(SpatialTransformerConfig::new(3).validate().is_ok());
    }
}
