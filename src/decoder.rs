//! Neural ODE decoder: latent initial state to observation trajectory.

use crate::activation::FieldActivation;
use crate::error::{OdeVaeError, Result};
use crate::ode::{Integrator, OdeFunc, SolverConfig};
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use tracing::trace;

/// Shared query-time axis of a `[steps, batch, width]` time tensor.
///
/// Batch items share query times, so only `t[:, 0, 0]` is read.
pub fn query_times<B: Backend>(t: Tensor<B, 3>) -> Result<Vec<f64>> {
    let [steps, batch, width] = t.dims();
    if steps == 0 || batch == 0 || width == 0 {
        return Err(OdeVaeError::shape_mismatch(
            "decoder timestamps",
            "[steps >= 1, batch >= 1, width >= 1]",
            [steps, batch, width],
        ));
    }

    t.narrow(1, 0, 1)
        .narrow(2, 0, 1)
        .reshape([steps])
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .map_err(|err| OdeVaeError::TensorData(format!("{err:?}")))
}

/// Decoder integrating `z0` through a learned vector field
#[derive(Module, Debug)]
pub struct NeuralOdeDecoder<B: Backend> {
    func: OdeFunc<B>,
    /// Latent to hidden
    l2h: Linear<B>,
    /// Hidden to observation
    h2o: Linear<B>,
    solver: Ignored<SolverConfig>,
    #[module(skip)]
    output_dim: usize,
}

impl<B: Backend> NeuralOdeDecoder<B> {
    /// Decoder with a time-invariant tanh vector field and the default solver.
    pub fn new(output_dim: usize, hidden_dim: usize, latent_dim: usize, device: &B::Device) -> Self {
        Self {
            func: OdeFunc::new(latent_dim, hidden_dim, true, device),
            l2h: LinearConfig::new(latent_dim, hidden_dim).init(device),
            h2o: LinearConfig::new(hidden_dim, output_dim).init(device),
            solver: Ignored(SolverConfig::default()),
            output_dim,
        }
    }

    /// Replace the vector field, e.g. to make it time dependent.
    pub fn with_field(
        mut self,
        hidden_dim: usize,
        time_invariant: bool,
        activation: FieldActivation,
        device: &B::Device,
    ) -> Self {
        let latent_dim = self.func.latent_dim();
        self.func = OdeFunc::new(latent_dim, hidden_dim, time_invariant, device).with_activation(activation);
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = Ignored(solver);
        self
    }

    pub fn solver(&self) -> SolverConfig {
        *self.solver
    }

    pub fn field(&self) -> &OdeFunc<B> {
        &self.func
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Decode along the time axis of `t`
    ///
    /// # Arguments
    /// * `z0` - Latent initial state `[batch, latent_dim]`
    /// * `t` - Query times `[steps, batch, 1]`; only `t[:, 0, 0]` is used
    ///
    /// # Returns
    /// Reconstruction `[steps, batch, output_dim]`
    pub fn forward(&self, z0: Tensor<B, 2>, t: Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let times = query_times(t)?;
        self.decode_with(z0, &times, &*self.solver)
    }

    /// Decode at explicit query times with any integrator.
    pub fn decode_with(
        &self,
        z0: Tensor<B, 2>,
        times: &[f64],
        integrator: &dyn Integrator<B>,
    ) -> Result<Tensor<B, 3>> {
        trace!(solver = integrator.name(), points = times.len(), "decoding latent trajectory");
        let zs = integrator.integrate(&self.func, z0, times)?;
        let hs = self.l2h.forward(zs);
        Ok(self.h2o.forward(hs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::Rk4;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_query_times_use_first_batch_column() {
        let device = Default::default();
        let t = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![0.0f32, 9.0, 0.5, 9.0, 2.0, 9.0], [3, 2, 1]),
            &device,
        );

        assert_eq!(query_times(t).unwrap(), vec![0.0, 0.5, 2.0]);
    }

    #[test]
    fn test_decoder_output_is_step_major() {
        let device = Default::default();
        let decoder = NeuralOdeDecoder::<TestBackend>::new(3, 8, 4, &device);

        let z0 = Tensor::<TestBackend, 2>::zeros([2, 4], &device);
        let t = Tensor::<TestBackend, 3>::from_data(
            TensorData::new((0..14).map(|i| (i / 2) as f32 * 0.1).collect::<Vec<_>>(), [7, 2, 1]),
            &device,
        );

        let x_hat = decoder.forward(z0, t).unwrap();
        assert_eq!(x_hat.dims(), [7, 2, 3]);
    }

    #[test]
    fn test_custom_integrator() {
        let device = Default::default();
        let decoder = NeuralOdeDecoder::<TestBackend>::new(2, 8, 3, &device);
        let z0 = Tensor::<TestBackend, 2>::ones([1, 3], &device);

        let x_hat = decoder
            .decode_with(z0, &[0.0, 0.25, 1.0], &Rk4::new(0.1).unwrap())
            .unwrap();
        assert_eq!(x_hat.dims(), [3, 1, 2]);
    }
}
