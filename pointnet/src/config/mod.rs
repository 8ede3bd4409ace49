//! Configuration types for pointnet.
//!
//! This module provides Burn-style configuration structs for the networks
//! and the training losses.

mod loss;
mod network;

pub use loss::PointNetLossConfig;
pub use network::{
    PointNetAutoEncoderConfig, PointNetClsConfig, PointNetFeatConfig, PointNetPartSegConfig,
    SpatialTransformerConfig, GLOBAL_FEATURE_DIM, POINT_FEATURE_DIM,
};
