//! Shape, invariance and equivariance tests for the PointNet networks.

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::Distribution;

use pointnet::{
    config::{
        PointNetAutoEncoderConfig, PointNetClsConfig, PointNetFeatConfig, PointNetPartSegConfig,
        SpatialTransformerConfig,
    },
    PointNetError,
};

type TestBackend = NdArray;

fn random_cloud(batch: usize, num_points: usize) -> Tensor<TestBackend, 3> {
    Tensor::random(
        [batch, num_points, 3],
        Distribution::Normal(0.0, 1.0),
        &Default::default(),
    )
}

/// Indices that reverse and rotate `n` points.
fn shuffled_indices(n: usize) -> Tensor<TestBackend, 1, Int> {
    let indices: Vec<i32> = (0..n).map(|i| ((n - 1 - i + 3) % n) as i32).collect();
    Tensor::from_ints(TensorData::new(indices, [n]), &Default::default())
}

fn max_abs_diff<const D: usize>(a: Tensor<TestBackend, D>, b: Tensor<TestBackend, D>) -> f32 {
    (a - b).abs().max().into_scalar()
}

#[test]
fn test_feat_shape_independent_of_point_count() {
    let device = Default::default();
    let feat = PointNetFeatConfig::new()
        .with_input_transform(true)
        .with_feature_transform(true)
        .init::<TestBackend>(&device)
        .unwrap();

    for num_points in [1, 7, 64] {
        let output = feat.forward(random_cloud(3, num_points));
        assert_eq!(output.dims(), [3, 1024]);
    }
}

#[test]
fn test_feat_permutation_invariance() {
    let device = Default::default();
    let feat = PointNetFeatConfig::new()
        .with_input_transform(true)
        .with_feature_transform(true)
        .init::<TestBackend>(&device)
        .unwrap();

    let points = random_cloud(2, 32);
    let shuffled = points.clone().select(1, shuffled_indices(32));

    let diff = max_abs_diff(feat.forward(points), feat.forward(shuffled));
    assert!(diff < 1e-4, "Max diff: {}", diff);
}

#[test]
fn test_stn_identity_when_output_weights_are_zero() {
    let device = Default::default();

    for (k, batch) in [(3, 1), (3, 4), (64, 2)] {
        let stn = SpatialTransformerConfig::new(k)
            .with_identity_init(true)
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::random([batch, k, 10], Distribution::Normal(0.0, 1.0), &device);
        let output = stn.forward(input);
        assert_eq!(output.dims(), [batch, k, k]);

        let values: Vec<f32> = output.into_data().to_vec().unwrap();
        for (i, v) in values.iter().enumerate() {
            let (row, col) = ((i / k) % k, i % k);
            let expected = if row == col { 1.0 } else { 0.0 };
            assert_eq!(*v, expected, "k={} entry ({}, {})", k, row, col);
        }
    }
}

#[test]
fn test_cls_shape_for_any_class_count() {
    let device = Default::default();

    for num_classes in [1, 2, 40] {
        let model = PointNetClsConfig::new(num_classes)
            .init::<TestBackend>(&device)
            .unwrap();
        assert_eq!(model.forward(random_cloud(2, 16)).dims(), [2, num_classes]);
    }
}

#[test]
fn test_cls_flags_change_logits_not_shape() {
    let device = Default::default();
    let points = random_cloud(2, 16);

    let plain = PointNetClsConfig::new(8).init::<TestBackend>(&device).unwrap();
    let aligned = PointNetClsConfig::new(8)
        .with_input_transform(true)
        .with_feature_transform(true)
        .init::<TestBackend>(&device)
        .unwrap();

    let plain_logits = plain.forward(points.clone());
    let aligned_logits = aligned.forward(points);

    assert_eq!(plain_logits.dims(), aligned_logits.dims());
    assert!(max_abs_diff(plain_logits, aligned_logits) > 0.0);
}

#[test]
fn test_part_seg_shape() {
    let device = Default::default();
    let model = PointNetPartSegConfig::new()
        .with_num_parts(4)
        .init::<TestBackend>(&device)
        .unwrap();

    assert_eq!(model.forward(random_cloud(2, 24)).dims(), [2, 4, 24]);
}

#[test]
fn test_part_seg_permutation_equivariance() {
    let device = Default::default();
    let model = PointNetPartSegConfig::new()
        .with_num_parts(5)
        .init::<TestBackend>(&device)
        .unwrap();

    let points = random_cloud(2, 20);
    let indices = shuffled_indices(20);

    let logits = model.forward(points.clone());
    let shuffled_logits = model.forward(points.select(1, indices.clone()));

    // Permuting the input permutes the point axis of the output.
    let diff = max_abs_diff(logits.select(2, indices), shuffled_logits);
    assert!(diff < 1e-4, "Max diff: {}", diff);
}

#[test]
fn test_autoencoder_output_matches_input_shape() {
    let device = Default::default();
    let model = PointNetAutoEncoderConfig::new(128)
        .init::<TestBackend>(&device)
        .unwrap();

    let points = random_cloud(3, 128);
    let dims = points.dims();

    assert_eq!(model.forward(points).dims(), dims);
}

#[test]
fn test_autoencoder_is_deterministic_for_fixed_weights() {
    let device = Default::default();
    let model = PointNetAutoEncoderConfig::new(32)
        .init::<TestBackend>(&device)
        .unwrap();

    let points = random_cloud(1, 32);
    let diff = max_abs_diff(model.forward(points.clone()), model.forward(points));
    assert_eq!(diff, 0.0);
}

#[test]
fn test_try_forward_reports_bad_input() {
    let device = Default::default();
    let model = PointNetClsConfig::new(3).init::<TestBackend>(&device).unwrap();

    let err = model
        .try_forward(Tensor::zeros([2, 16, 6], &device))
        .unwrap_err();
    assert!(matches!(err, PointNetError::ShapeMismatch { .. }));

    let err = model
        .try_forward(Tensor::zeros([2, 0, 3], &device))
        .unwrap_err();
    assert_eq!(err, PointNetError::EmptyPointCloud);
}
