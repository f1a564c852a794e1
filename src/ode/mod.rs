//! # Latent ODE Integration
//!
//! Numerical integration of `dz/dt = f(t, z)` for batched latent states.
//!
//! ## Available Integrators
//!
//! - [`Euler`]: first order, fixed substeps no longer than `max_step`
//! - [`Rk4`]: classical fourth-order Runge-Kutta with the same substep rule
//! - [`Dopri5`]: adaptive Dormand-Prince 5(4)
//!
//! Every integrator honors the same contract: given `z0` of shape
//! `[batch, latent]` and query times `t_0..t_{n-1}`, it returns a trajectory
//! `[n, batch, latent]` whose first entry is `z0` (the state at `t_0`) and
//! whose entry `i` is the state at `t_i`, integrating interval by interval.
//! All arithmetic is ordinary tensor arithmetic, so with an autodiff backend
//! gradients flow back into `z0` and the vector field's parameters.

mod dopri5;
mod euler;
mod field;
mod rk4;

pub use dopri5::Dopri5;
pub use euler::Euler;
pub use field::OdeFunc;
pub use rk4::Rk4;

use crate::error::{OdeVaeError, Result};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Right-hand side `dz/dt = f(t, z)` over `[batch, latent]` states.
pub trait VectorField<B: Backend> {
    fn evaluate(&self, t: f64, z: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// Produces latent states at requested times.
pub trait Integrator<B: Backend> {
    /// Integrate `field` from `z0` at `times[0]` through every entry of `times`.
    ///
    /// # Returns
    /// Trajectory `[times.len(), batch, latent]`
    fn integrate(
        &self,
        field: &dyn VectorField<B>,
        z0: Tensor<B, 2>,
        times: &[f64],
    ) -> Result<Tensor<B, 3>>;

    fn name(&self) -> &'static str;
}

/// Wraps a closure as a [`VectorField`].
pub struct ClosureField<F> {
    func: F,
}

impl<F> ClosureField<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<B, F> VectorField<B> for ClosureField<F>
where
    B: Backend,
    F: Fn(f64, Tensor<B, 2>) -> Tensor<B, 2>,
{
    fn evaluate(&self, t: f64, z: Tensor<B, 2>) -> Tensor<B, 2> {
        (self.func)(t, z)
    }
}

/// Serializable integrator selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolverConfig {
    Euler {
        max_step: f64,
    },
    Rk4 {
        max_step: f64,
    },
    Dopri5 {
        rtol: f64,
        atol: f64,
        max_steps: usize,
        min_step: f64,
    },
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::Euler { max_step: 0.05 }
    }
}

impl SolverConfig {
    /// Default adaptive settings.
    pub fn dopri5() -> Self {
        SolverConfig::Dopri5 {
            rtol: 1e-4,
            atol: 1e-6,
            max_steps: 10_000,
            min_step: 1e-10,
        }
    }

    /// Check the numeric settings without integrating anything.
    pub fn validate(&self) -> Result<()> {
        match *self {
            SolverConfig::Euler { max_step } => Euler::new(max_step).map(|_| ()),
            SolverConfig::Rk4 { max_step } => Rk4::new(max_step).map(|_| ()),
            SolverConfig::Dopri5 {
                rtol,
                atol,
                max_steps,
                min_step,
            } => Dopri5::new(rtol, atol, max_steps, min_step).map(|_| ()),
        }
    }
}

impl<B: Backend> Integrator<B> for SolverConfig {
    fn integrate(
        &self,
        field: &dyn VectorField<B>,
        z0: Tensor<B, 2>,
        times: &[f64],
    ) -> Result<Tensor<B, 3>> {
        match *self {
            SolverConfig::Euler { max_step } => Euler::new(max_step)?.integrate(field, z0, times),
            SolverConfig::Rk4 { max_step } => Rk4::new(max_step)?.integrate(field, z0, times),
            SolverConfig::Dopri5 {
                rtol,
                atol,
                max_steps,
                min_step,
            } => Dopri5::new(rtol, atol, max_steps, min_step)?.integrate(field, z0, times),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SolverConfig::Euler { .. } => "euler",
            SolverConfig::Rk4 { .. } => "rk4",
            SolverConfig::Dopri5 { .. } => "dopri5",
        }
    }
}

/// Reject empty or non-finite query times.
pub(crate) fn check_times(times: &[f64]) -> Result<()> {
    if times.is_empty() {
        return Err(OdeVaeError::invalid_parameter(
            "times",
            "at least one query time is required",
        ));
    }
    if let Some(bad) = times.iter().find(|t| !t.is_finite()) {
        return Err(OdeVaeError::invalid_parameter(
            "times",
            format!("query time {bad} is not finite"),
        ));
    }
    Ok(())
}

pub(crate) fn check_max_step(max_step: f64) -> Result<()> {
    if max_step.is_finite() && max_step > 0.0 {
        Ok(())
    } else {
        Err(OdeVaeError::invalid_parameter(
            "max_step",
            format!("must be positive and finite, got {max_step}"),
        ))
    }
}

/// Shared driver for the fixed-substep schemes.
///
/// Each interval `[t_i, t_{i+1}]` is split into `ceil(|dt| / max_step)` equal
/// substeps; zero-length intervals repeat the previous state.
pub(crate) fn integrate_fixed<B, S>(
    max_step: f64,
    field: &dyn VectorField<B>,
    z0: Tensor<B, 2>,
    times: &[f64],
    step: S,
) -> Result<Tensor<B, 3>>
where
    B: Backend,
    S: Fn(&dyn VectorField<B>, f64, Tensor<B, 2>, f64) -> Tensor<B, 2>,
{
    check_times(times)?;

    let mut z = z0;
    let mut states = Vec::with_capacity(times.len());
    states.push(z.clone());

    for window in times.windows(2) {
        let (t0, t1) = (window[0], window[1]);
        let substeps = ((t1 - t0).abs() / max_step).ceil() as usize;
        if substeps > 0 {
            let h = (t1 - t0) / substeps as f64;
            for k in 0..substeps {
                z = step(field, t0 + k as f64 * h, z, h);
            }
        }
        states.push(z.clone());
    }

    Ok(Tensor::stack(states, 0))
}
