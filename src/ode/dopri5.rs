//! # Dormand-Prince 5(4) Method
//!
//! Adaptive step-size Runge-Kutta with 5th order solution and embedded 4th
//! order error estimate. The step size is carried across query intervals and
//! clipped so that every query time is hit exactly.

use super::{check_times, Integrator, VectorField};
use crate::error::{OdeVaeError, Result};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};
use tracing::{trace, warn};

// Dormand-Prince coefficients
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th and 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Dormand-Prince 5(4) adaptive integrator
#[derive(Debug, Clone, Copy)]
pub struct Dopri5 {
    rtol: f64,
    atol: f64,
    max_steps: usize,
    min_step: f64,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self {
            rtol: 1e-4,
            atol: 1e-6,
            max_steps: 10_000,
            min_step: 1e-10,
        }
    }
}

impl Dopri5 {
    pub fn new(rtol: f64, atol: f64, max_steps: usize, min_step: f64) -> Result<Self> {
        for (name, value) in [("rtol", rtol), ("atol", atol), ("min_step", min_step)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OdeVaeError::invalid_parameter(
                    name,
                    format!("must be positive and finite, got {value}"),
                ));
            }
        }
        if max_steps == 0 {
            return Err(OdeVaeError::invalid_parameter("max_steps", "must be at least 1"));
        }
        Ok(Self {
            rtol,
            atol,
            max_steps,
            min_step,
        })
    }

    /// One trial step. Returns `(z_new, z_err)`.
    fn step_with_error<B: Backend>(
        &self,
        field: &dyn VectorField<B>,
        z: &Tensor<B, 2>,
        t: f64,
        h: f64,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let k1 = field.evaluate(t, z.clone());

        let z2 = z.clone() + k1.clone() * (h * A21);
        let k2 = field.evaluate(t + C2 * h, z2);

        let z3 = z.clone() + k1.clone() * (h * A31) + k2.clone() * (h * A32);
        let k3 = field.evaluate(t + C3 * h, z3);

        let z4 = z.clone() + k1.clone() * (h * A41) + k2.clone() * (h * A42) + k3.clone() * (h * A43);
        let k4 = field.evaluate(t + C4 * h, z4);

        let z5 = z.clone()
            + k1.clone() * (h * A51)
            + k2.clone() * (h * A52)
            + k3.clone() * (h * A53)
            + k4.clone() * (h * A54);
        let k5 = field.evaluate(t + C5 * h, z5);

        let z6 = z.clone()
            + k1.clone() * (h * A61)
            + k2 * (h * A62)
            + k3.clone() * (h * A63)
            + k4.clone() * (h * A64)
            + k5.clone() * (h * A65);
        let k6 = field.evaluate(t + h, z6);

        let z_new = z.clone()
            + k1.clone() * (h * B1)
            + k3.clone() * (h * B3)
            + k4.clone() * (h * B4)
            + k5.clone() * (h * B5)
            + k6.clone() * (h * B6);

        let k7 = field.evaluate(t + h, z_new.clone());

        let z_err = k1 * (h * E1) + k3 * (h * E3) + k4 * (h * E4) + k5 * (h * E5) + k6 * (h * E6) + k7 * (h * E7);

        (z_new, z_err)
    }

    /// RMS of the scaled local error; accepted when `<= 1`.
    fn error_norm<B: Backend>(&self, z_err: Tensor<B, 2>, z: &Tensor<B, 2>, z_new: &Tensor<B, 2>) -> f64 {
        let scale = z
            .clone()
            .detach()
            .abs()
            .max_pair(z_new.clone().detach().abs())
            .mul_scalar(self.rtol)
            .add_scalar(self.atol);

        let ratio = z_err.detach().div(scale);
        ratio.powf_scalar(2.0).mean().sqrt().into_scalar().elem::<f64>()
    }

    fn next_step(&self, h: f64, err: f64) -> f64 {
        if err == 0.0 {
            return h * MAX_FACTOR;
        }
        let factor = (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR);
        h * factor
    }
}

impl<B: Backend> Integrator<B> for Dopri5 {
    fn integrate(
        &self,
        field: &dyn VectorField<B>,
        z0: Tensor<B, 2>,
        times: &[f64],
    ) -> Result<Tensor<B, 3>> {
        check_times(times)?;

        let span = times
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0f64, f64::max);
        let mut h_abs = (span / 100.0).max(self.min_step);

        let mut z = z0;
        let mut states = Vec::with_capacity(times.len());
        states.push(z.clone());

        let mut attempts = 0usize;
        let mut rejected = 0usize;

        for window in times.windows(2) {
            let (t_start, t_end) = (window[0], window[1]);
            let direction = if t_end >= t_start { 1.0 } else { -1.0 };
            let mut t = t_start;

            while (t_end - t) * direction > 0.0 {
                if attempts >= self.max_steps {
                    return Err(OdeVaeError::IntegrationFailed {
                        solver: "dopri5",
                        time: t,
                        reason: format!("step budget of {} exhausted", self.max_steps),
                    });
                }
                attempts += 1;

                let remaining = (t_end - t).abs();
                let last = h_abs >= remaining;
                let h = direction * if last { remaining } else { h_abs };

                let (z_new, z_err) = self.step_with_error(field, &z, t, h);
                let err = self.error_norm(z_err, &z, &z_new);
                if !err.is_finite() {
                    return Err(OdeVaeError::IntegrationFailed {
                        solver: "dopri5",
                        time: t,
                        reason: "local error estimate is not finite".to_string(),
                    });
                }

                let proposal = self.next_step(h.abs(), err);
                if err <= 1.0 {
                    t = if last { t_end } else { t + h };
                    z = z_new;
                    // A clipped final step says nothing about the usable step size
                    h_abs = if last { h_abs.max(proposal) } else { proposal };
                } else {
                    rejected += 1;
                    h_abs = proposal;
                    if h_abs < self.min_step {
                        return Err(OdeVaeError::IntegrationFailed {
                            solver: "dopri5",
                            time: t,
                            reason: format!("step size {h_abs:e} fell below minimum {:e}", self.min_step),
                        });
                    }
                }
            }
            states.push(z.clone());
        }

        if rejected > attempts / 2 && attempts > 10 {
            warn!(attempts, rejected, "dopri5 rejected most trial steps");
        }
        trace!(attempts, rejected, points = times.len(), "dopri5 integration");

        Ok(Tensor::stack(states, 0))
    }

    fn name(&self) -> &'static str {
        "dopri5"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::ClosureField;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_exponential_growth() {
        let device = Default::default();
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z);
        let z0 = Tensor::<TestBackend, 2>::ones([1, 1], &device);

        let traj = Dopri5::default().integrate(&field, z0, &[0.0, 1.0]).unwrap();
        let last = traj.narrow(0, 1, 1).into_scalar();
        assert!((last - 1.0f32.exp()).abs() < 1e-3, "got {}", last);
    }

    #[test]
    fn test_hits_irregular_query_times() {
        let device = Default::default();
        // dz/dt = -10 z, moderately stiff
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z * (-10.0));
        let z0 = Tensor::<TestBackend, 2>::ones([1, 1], &device);
        let times = [0.0, 0.03, 0.1, 0.35];

        let traj = Dopri5::default().integrate(&field, z0, &times).unwrap();
        assert_eq!(traj.dims(), [4, 1, 1]);

        for (i, &t) in times.iter().enumerate() {
            let got = traj.clone().narrow(0, i, 1).into_scalar();
            let expected = (-10.0 * t as f32).exp();
            assert!((got - expected).abs() < 1e-3, "t={}: got {}, expected {}", t, got, expected);
        }
    }

    #[test]
    fn test_step_budget_exhaustion_fails() {
        let device = Default::default();
        let field = ClosureField::new(|_t: f64, z: Tensor<TestBackend, 2>| z);
        let z0 = Tensor::<TestBackend, 2>::ones([1, 1], &device);

        let solver = Dopri5::new(1e-4, 1e-6, 2, 1e-10).unwrap();
        let result = solver.integrate(&field, z0, &[0.0, 10.0]);
        assert!(matches!(result, Err(OdeVaeError::IntegrationFailed { solver: "dopri5", .. })));
    }

    #[test]
    fn test_rejects_bad_tolerances() {
        assert!(Dopri5::new(0.0, 1e-6, 10, 1e-10).is_err());
        assert!(Dopri5::new(1e-4, 1e-6, 0, 1e-10).is_err());
    }
}
