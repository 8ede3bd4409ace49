//! Point cloud data structures and tensor batching.

use burn::prelude::*;

use crate::error::{PointNetError, Result};

/// A host-side point cloud.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<[f32; 3]>,
}

impl PointCloud {
    /// Create a new point cloud from points.
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        Self { points }
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Compute the centroid.
    pub fn centroid(&self) -> Option<[f32; 3]> {
        if self.points.is_empty() {
            return None;
        }

        let mut sum = [0.0f32; 3];
        for p in &self.points {
            for axis in 0..3 {
                sum[axis] += p[axis];
            }
        }

        let n = self.points.len() as f32;
        Some(sum.map(|s| s / n))
    }

    /// Center the point cloud at the origin.
    pub fn center(&mut self) {
        if let Some(centroid) = self.centroid() {
            for p in &mut self.points {
                for axis in 0..3 {
                    p[axis] -= centroid[axis];
                }
            }
        }
    }

    /// Center the point cloud and scale it into the unit sphere.
    pub fn normalize(&mut self) {
        self.center();

        let radius = self
            .points
            .iter()
            .map(|p| (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt())
            .fold(0.0f32, f32::max);

        if radius > 0.0 {
            for p in &mut self.points {
                *p = p.map(|v| v / radius);
            }
        }
    }

    /// Convert to a tensor of shape [num_points, 3].
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let flat: Vec<f32> = self.points.iter().flatten().copied().collect();
        Tensor::from_data(TensorData::new(flat, [self.points.len(), 3]), device)
    }
}

impl From<Vec<[f32; 3]>> for PointCloud {
    fn from(points: Vec<[f32; 3]>) -> Self {
        Self::new(points)
    }
}

/// Stack equally sized clouds into a tensor of shape [batch, num_points, 3].
pub fn batch_to_tensor<B: Backend>(
    clouds: &[PointCloud],
    device: &B::Device,
) -> Result<Tensor<B, 3>> {
    let num_points = match clouds.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(PointNetError::EmptyPointCloud),
    };

    let mut flat: Vec<f32> = Vec::with_capacity(clouds.len() * num_points * 3);
    for (index, cloud) in clouds.iter().enumerate() {
        if cloud.len() != num_points {
            return Err(PointNetError::InconsistentBatch {
                index,
                expected: num_points,
                got: cloud.len(),
            });
        }
        flat.extend(cloud.points.iter().flatten());
    }

    Ok(Tensor::from_data(
        TensorData::new(flat, [clouds.len(), num_points, 3]),
        device,
    ))
}
