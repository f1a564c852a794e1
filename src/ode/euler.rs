//! # Euler Method
//!
//! ```text
//! z_{n+1} = z_n + h * f(t_n, z_n)
//! ```
//!
//! With `max_step = 0.05` this is the default latent integrator.

use super::{check_max_step, integrate_fixed, Integrator, VectorField};
use crate::error::Result;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use tracing::trace;

/// Fixed-substep explicit Euler integrator
#[derive(Debug, Clone, Copy)]
pub struct Euler {
    max_step: f64,
}

impl Euler {
    pub fn new(max_step: f64) -> Result<Self> {
        check_max_step(max_step)?;
        Ok(Self { max_step })
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }
}

impl<B: Backend> Integrator<B> for Euler {
    fn integrate(
        &self,
        field: &dyn VectorField<B>,
        z0: Tensor<B, 2>,
        times: &[f64],
    ) -> Result<Tensor<B, 3>> {
        trace!(max_step = self.max_step, points = times.len(), "euler integration");
        integrate_fixed(self.max_step, field, z0, times, |field, t, z, h| {
            let dz = field.evaluate(t, z.clone());
            z + dz * h
        })
    }

    fn name(&self) -> &'static str {
        "euler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::ClosureField;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_first_state_is_initial_condition() {
        let device = Default::default();
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z);
        let z0 = Tensor::<TestBackend, 2>::full([2, 3], 0.5, &device);

        let traj = Euler::new(0.1).unwrap().integrate(&field, z0, &[2.0, 3.0]).unwrap();
        let first = traj.narrow(0, 0, 1).sub_scalar(0.5).abs().max().into_scalar();
        assert!(first < 1e-7);
    }

    #[test]
    fn test_single_step_matches_formula() {
        let device = Default::default();
        // dz/dt = 2 for every component: one step of size 0.05 from z=1
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z.zeros_like().add_scalar(2.0));
        let z0 = Tensor::<TestBackend, 2>::ones([1, 1], &device);

        let traj = Euler::new(0.05).unwrap().integrate(&field, z0, &[0.0, 0.05]).unwrap();
        let last = traj.narrow(0, 1, 1).into_scalar();
        assert!((last - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_time_keeps_state() {
        let device = Default::default();
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z);
        let z0 = Tensor::<TestBackend, 2>::ones([1, 2], &device);

        let traj = Euler::new(0.05).unwrap().integrate(&field, z0, &[1.0, 1.0]).unwrap();
        let diff = (traj.clone().narrow(0, 0, 1) - traj.narrow(0, 1, 1)).abs().max().into_scalar();
        assert_eq!(diff, 0.0);
    }

    #[test]
    fn test_backwards_integration() {
        let device = Default::default();
        // dz/dt = 1, going from t=1 back to t=0 subtracts one
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z.ones_like());
        let z0 = Tensor::<TestBackend, 2>::ones([1, 1], &device);

        let traj = Euler::new(0.1).unwrap().integrate(&field, z0, &[1.0, 0.0]).unwrap();
        let last = traj.narrow(0, 1, 1).into_scalar();
        assert!(last.abs() < 1e-5);
    }

    #[test]
    fn test_rejects_non_positive_step() {
        assert!(Euler::new(0.0).is_err());
        assert!(Euler::new(-0.1).is_err());
    }
}
