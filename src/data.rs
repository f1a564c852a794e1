//! Synthetic irregularly-sampled spirals.
//!
//! Each sequence is a noisy 2-D spiral `r(t) * (cos θ(t), sin θ(t))` with
//! `r(t) = r0 + growth * t` and `θ(t) = phase + direction * t`. Sampling
//! times are sorted uniform draws shared across the batch, so consecutive
//! steps are unevenly spaced. Data is built on the host with `ndarray` and
//! handed to the model as step-major tensors.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use ndarray::{s, Array3};
use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{OdeVaeError, Result};

/// Generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralConfig {
    /// Batch size
    pub sequences: usize,
    /// Samples per sequence
    pub steps: usize,
    /// Sampling window `[0, max_time]`
    pub max_time: f64,
    /// Standard deviation of additive observation noise
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            sequences: 16,
            steps: 30,
            max_time: 6.0,
            noise_std: 0.05,
            seed: 42,
        }
    }
}

/// Step-major spiral batch
#[derive(Debug, Clone)]
pub struct SpiralBatch {
    /// `[steps, batch, 2]`
    pub values: Array3<f32>,
    /// `[steps, batch, 1]`
    pub times: Array3<f32>,
}

impl SpiralConfig {
    pub fn generate(&self) -> Result<SpiralBatch> {
        if self.sequences == 0 || self.steps == 0 {
            return Err(OdeVaeError::invalid_parameter(
                "sequences/steps",
                "need at least one sequence of one step",
            ));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(OdeVaeError::invalid_parameter(
                "max_time",
                format!("must be positive and finite, got {}", self.max_time),
            ));
        }
        let noise = Normal::new(0.0, self.noise_std)
            .map_err(|err| OdeVaeError::invalid_parameter("noise_std", err.to_string()))?;

        let mut rng = StdRng::seed_from_u64(self.seed);

        // First sample pinned at t = 0 so the window always starts there
        let window = Uniform::new(0.0, self.max_time);
        let mut times: Vec<f64> = std::iter::once(0.0)
            .chain((1..self.steps).map(|_| rng.sample(&window)))
            .collect();
        times.sort_by(f64::total_cmp);

        let mut values = Array3::<f32>::zeros((self.steps, self.sequences, 2));
        let mut time_grid = Array3::<f32>::zeros((self.steps, self.sequences, 1));

        for b in 0..self.sequences {
            let r0 = rng.gen_range(0.5..1.5);
            let growth = rng.gen_range(0.1..0.4);
            let phase = rng.gen_range(0.0..std::f64::consts::TAU);
            let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

            for (i, &t) in times.iter().enumerate() {
                let radius = r0 + growth * t;
                let angle = phase + direction * t;
                values[[i, b, 0]] = (radius * angle.cos() + rng.sample(&noise)) as f32;
                values[[i, b, 1]] = (radius * angle.sin() + rng.sample(&noise)) as f32;
                time_grid[[i, b, 0]] = t as f32;
            }
        }

        Ok(SpiralBatch {
            values,
            times: time_grid,
        })
    }
}

impl SpiralBatch {
    pub fn steps(&self) -> usize {
        self.values.dim().0
    }

    pub fn batch_size(&self) -> usize {
        self.values.dim().1
    }

    /// First `steps` observations, e.g. as encoder context for forecasting.
    pub fn head(&self, steps: usize) -> SpiralBatch {
        let steps = steps.min(self.steps());
        SpiralBatch {
            values: self.values.slice(s![..steps, .., ..]).to_owned(),
            times: self.times.slice(s![..steps, .., ..]).to_owned(),
        }
    }

    /// Values and times as `([steps, batch, 2], [steps, batch, 1])` tensors.
    pub fn to_tensors<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 3>, Tensor<B, 3>) {
        (to_tensor(&self.values, device), to_tensor(&self.times, device))
    }
}

fn to_tensor<B: Backend>(array: &Array3<f32>, device: &B::Device) -> Tensor<B, 3> {
    let (d0, d1, d2) = array.dim();
    let data: Vec<f32> = array.iter().copied().collect();
    Tensor::from_data(TensorData::new(data, [d0, d1, d2]), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_shapes_and_sorted_times() {
        let batch = SpiralConfig::default().generate().unwrap();
        assert_eq!(batch.values.dim(), (30, 16, 2));
        assert_eq!(batch.times.dim(), (30, 16, 1));

        let column: Vec<f32> = (0..batch.steps()).map(|i| batch.times[[i, 0, 0]]).collect();
        assert_eq!(column[0], 0.0);
        assert!(column.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_times_shared_across_batch() {
        let batch = SpiralConfig::default().generate().unwrap();
        for i in 0..batch.steps() {
            let t0 = batch.times[[i, 0, 0]];
            assert!((0..batch.batch_size()).all(|b| batch.times[[i, b, 0]] == t0));
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let a = SpiralConfig::default().generate().unwrap();
        let b = SpiralConfig::default().generate().unwrap();
        assert_eq!(a.values, b.values);

        let c = SpiralConfig {
            seed: 7,
            ..SpiralConfig::default()
        }
        .generate()
        .unwrap();
        assert_ne!(a.values, c.values);
    }

    #[test]
    fn test_head_and_tensors() {
        let batch = SpiralConfig {
            sequences: 3,
            steps: 10,
            ..SpiralConfig::default()
        }
        .generate()
        .unwrap();

        let context = batch.head(4);
        assert_eq!(context.steps(), 4);

        let device = Default::default();
        let (x, t) = context.to_tensors::<TestBackend>(&device);
        assert_eq!(x.dims(), [4, 3, 2]);
        assert_eq!(t.dims(), [4, 3, 1]);

        let first = x.narrow(0, 1, 1).narrow(1, 2, 1).narrow(2, 1, 1).into_scalar();
        assert_eq!(first, batch.values[[1, 2, 1]]);
    }

    #[test]
    fn test_rejects_empty_batch() {
        let config = SpiralConfig {
            sequences: 0,
            ..SpiralConfig::default()
        };
        assert!(config.generate().is_err());
    }
}
