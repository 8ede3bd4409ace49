//! Example: Training a PointNet classifier on synthetic shapes.
//!
//! This example walks through the full classification workflow:
//! 1. Sample sphere, cube and cylinder surfaces into point clouds
//! 2. Normalize and batch them into tensors
//! 3. Train `PointNetCls` with the orthogonality regularizer
//! 4. Evaluate the trained model in inference mode
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p pointnet --example classify_pointcloud
//! ```

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;

use pointnet::prelude::*;

type MyBackend = Autodiff<NdArray>;

const NUM_POINTS: usize = 256;
const CLOUDS_PER_CLASS: usize = 4;
const EPOCHS: usize = 20;
const LEARNING_RATE: f64 = 1e-3;
const CLASS_NAMES: [&str; 3] = ["sphere", "cube", "cylinder"];

fn main() {
    env_logger::init();

    let device = burn::backend::ndarray::NdArrayDevice::Cpu;

    println!("═══════════════════════════════════════════════════════════════");
    println!("          PointNet Classification on Synthetic Shapes");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    // =========================================================================
    // Step 1: Generate the dataset
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 1: Sampling Shapes                                     │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let mut clouds = Vec::new();
    let mut labels = Vec::new();
    for (class, name) in CLASS_NAMES.iter().enumerate() {
        for variant in 0..CLOUDS_PER_CLASS {
            let scale = 1.0 + 0.5 * variant as f32;
            let mut cloud = sample_shape(class, NUM_POINTS, scale, variant as u32);
            cloud.normalize();
            clouds.push(cloud);
            labels.push(class as i32);
        }
        println!("  {:<10} {} clouds x {} points", name, CLOUDS_PER_CLASS, NUM_POINTS);
    }
    println!();

    let points = match batch_to_tensor::<MyBackend>(&clouds, &device) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("Error: could not batch point clouds: {}", e);
            return;
        }
    };
    let targets = Tensor::<MyBackend, 1, Int>::from_ints(
        TensorData::new(labels.clone(), [labels.len()]),
        &device,
    );

    // =========================================================================
    // Step 2: Build the model
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 2: Building PointNetCls                                │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let config = PointNetClsConfig::new(CLASS_NAMES.len())
        .with_input_transform(true)
        .with_feature_transform(true)
        .with_dropout(0.3);

    let mut model = match config.init::<MyBackend>(&device) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return;
        }
    };

    println!("  Classes:           {}", model.num_classes());
    println!("  Input transform:   {}", config.input_transform);
    println!("  Feature transform: {}", config.feature_transform);
    println!("  Parameters:        {}", model.num_params());
    println!();

    // =========================================================================
    // Step 3: Train
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 3: Training                                            │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let criterion = match PointNetLoss::new(PointNetLossConfig::default()) {
        Ok(criterion) => criterion,
        Err(e) => {
            eprintln!("Error: invalid loss configuration: {}", e);
            return;
        }
    };
    let mut optimizer = AdamConfig::new().init::<MyBackend, PointNetCls<MyBackend>>();

    for epoch in 1..=EPOCHS {
        let output = model.forward_with_transforms(points.clone());
        let loss = criterion.classification(&output, targets.clone());

        let task: f32 = loss.task.clone().into_scalar();
        let regularization: f32 = loss.regularization.clone().into_scalar();

        let grads = GradientsParams::from_grads(loss.total.backward(), &model);
        model = optimizer.step(LEARNING_RATE, model, grads);

        if epoch % 5 == 0 || epoch == 1 {
            println!(
                "  Epoch {:>3}: cross-entropy {:.4}, orthogonal {:.5}",
                epoch, task, regularization
            );
        }
    }
    println!();

    // =========================================================================
    // Step 4: Evaluate
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 4: Evaluating                                          │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let model = model.valid();
    let points = points.inner();

    let predictions: Vec<i64> = model
        .forward(points)
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .to_vec()
        .unwrap_or_default();

    let correct = predictions
        .iter()
        .zip(&labels)
        .filter(|(p, l)| **p == **l as i64)
        .count();

    println!("  Accuracy:          {}/{}", correct, labels.len());
    for (i, (p, l)) in predictions.iter().zip(&labels).enumerate() {
        let predicted = CLASS_NAMES.get(*p as usize).copied().unwrap_or("?");
        println!("  Cloud {:>2}: {:<10} (label {})", i, predicted, CLASS_NAMES[*l as usize]);
    }
    println!();
    println!("Done.");
}

/// Sample `n` points on the surface of a shape.
///
/// `0` is a sphere, `1` a cube and `2` a cylinder. `seed` shifts the sampling
/// pattern so clouds of the same class differ.
fn sample_shape(class: usize, n: usize, scale: f32, seed: u32) -> PointCloud {
    let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
    let offset = seed as f32 * 0.37;

    let points = (0..n)
        .map(|i| {
            let t = (i as f32 + 0.5) / n as f32;
            let theta = golden * i as f32 + offset;
            let point = match class {
                0 => {
                    let y = 1.0 - 2.0 * t;
                    let r = (1.0 - y * y).sqrt();
                    [r * theta.cos(), y, r * theta.sin()]
                }
                1 => {
                    // Project the sphere sample onto the cube surface.
                    let y = 1.0 - 2.0 * t;
                    let r = (1.0 - y * y).sqrt();
                    let p = [r * theta.cos(), y, r * theta.sin()];
                    let m = p.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
                    p.map(|v| v / m)
                }
                _ => [theta.cos(), 2.0 * t - 1.0, theta.sin()],
            };
            point.map(|v| v * scale)
        })
        .collect();

    PointCloud::new(points)
}
