//! Host-side point clouds and their conversion to tensors.

mod point_cloud;

pub use point_cloud::{batch_to_tensor, PointCloud};
