//! # Fourth-Order Runge-Kutta
//!
//! ```text
//! k1 = f(t, z)
//! k2 = f(t + h/2, z + h/2 * k1)
//! k3 = f(t + h/2, z + h/2 * k2)
//! k4 = f(t + h, z + h * k3)
//! z_{n+1} = z_n + h/6 * (k1 + 2*k2 + 2*k3 + k4)
//! ```

use super::{check_max_step, integrate_fixed, Integrator, VectorField};
use crate::error::Result;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use tracing::trace;

/// Fixed-substep classical Runge-Kutta integrator
#[derive(Debug, Clone, Copy)]
pub struct Rk4 {
    max_step: f64,
}

impl Rk4 {
    pub fn new(max_step: f64) -> Result<Self> {
        check_max_step(max_step)?;
        Ok(Self { max_step })
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }
}

impl<B: Backend> Integrator<B> for Rk4 {
    fn integrate(
        &self,
        field: &dyn VectorField<B>,
        z0: Tensor<B, 2>,
        times: &[f64],
    ) -> Result<Tensor<B, 3>> {
        trace!(max_step = self.max_step, points = times.len(), "rk4 integration");
        integrate_fixed(self.max_step, field, z0, times, |field, t, z, h| {
            let half = h / 2.0;
            let k1 = field.evaluate(t, z.clone());
            let k2 = field.evaluate(t + half, z.clone() + k1.clone() * half);
            let k3 = field.evaluate(t + half, z.clone() + k2.clone() * half);
            let k4 = field.evaluate(t + h, z.clone() + k3.clone() * h);

            z + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
        })
    }

    fn name(&self) -> &'static str {
        "rk4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::{ClosureField, Euler};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_rk4_more_accurate_than_euler() {
        let device = Default::default();
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z);
        let times = [0.0, 1.0];
        let expected = 1.0f32.exp();

        let z0 = Tensor::<TestBackend, 2>::ones([1, 1], &device);
        let euler = Euler::new(0.1).unwrap().integrate(&field, z0.clone(), &times).unwrap();
        let rk4 = Rk4::new(0.1).unwrap().integrate(&field, z0, &times).unwrap();

        let euler_err = (euler.narrow(0, 1, 1).into_scalar() - expected).abs();
        let rk4_err = (rk4.narrow(0, 1, 1).into_scalar() - expected).abs();
        assert!(rk4_err < 1e-4, "rk4 error {}", rk4_err);
        assert!(rk4_err < euler_err);
    }

    #[test]
    fn test_time_dependent_field() {
        let device = Default::default();
        // dz/dt = t  =>  z(2) = z(0) + 2
        let field =
            ClosureField::new(|t: f64, z: Tensor<TestBackend, 2>| z.zeros_like().add_scalar(t));
        let z0 = Tensor::<TestBackend, 2>::zeros([3, 2], &device);

        let traj = Rk4::new(0.25).unwrap().integrate(&field, z0, &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(traj.dims(), [3, 3, 2]);

        let at_one = traj.clone().narrow(0, 1, 1).mean().into_scalar();
        let at_two = traj.narrow(0, 2, 1).mean().into_scalar();
        assert!((at_one - 0.5).abs() < 1e-5);
        assert!((at_two - 2.0).abs() < 1e-5);
    }
}
