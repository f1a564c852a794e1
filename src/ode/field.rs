//! Learned latent vector field.

use super::VectorField;
use crate::activation::FieldActivation;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Feed-forward network giving `dz/dt`
///
/// `latent (+1 time column) -> hidden -> hidden -> latent`, with a smooth
/// activation after each hidden layer. In time-invariant mode `t` is ignored.
#[derive(Module, Debug)]
pub struct OdeFunc<B: Backend> {
    input: Linear<B>,
    hidden: Linear<B>,
    output: Linear<B>,
    activation: Ignored<FieldActivation>,
    #[module(skip)]
    time_invariant: bool,
    #[module(skip)]
    latent_dim: usize,
}

impl<B: Backend> OdeFunc<B> {
    pub fn new(latent_dim: usize, hidden_dim: usize, time_invariant: bool, device: &B::Device) -> Self {
        let input_dim = if time_invariant { latent_dim } else { latent_dim + 1 };

        Self {
            input: LinearConfig::new(input_dim, hidden_dim).init(device),
            hidden: LinearConfig::new(hidden_dim, hidden_dim).init(device),
            output: LinearConfig::new(hidden_dim, latent_dim).init(device),
            activation: Ignored(FieldActivation::default()),
            time_invariant,
            latent_dim,
        }
    }

    pub fn with_activation(mut self, activation: FieldActivation) -> Self {
        self.activation = Ignored(activation);
        self
    }

    pub fn activation(&self) -> FieldActivation {
        *self.activation
    }

    pub fn is_time_invariant(&self) -> bool {
        self.time_invariant
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// `dz/dt` for `z` of shape `[batch, latent_dim]`.
    pub fn forward(&self, t: f64, z: Tensor<B, 2>) -> Tensor<B, 2> {
        let input = if self.time_invariant {
            z
        } else {
            let [batch, _] = z.dims();
            let time = Tensor::<B, 2>::full([batch, 1], t, &z.device());
            Tensor::cat(vec![z, time], 1)
        };

        let h = self.activation.apply(self.input.forward(input));
        let h = self.activation.apply(self.hidden.forward(h));
        self.output.forward(h)
    }
}

impl<B: Backend> VectorField<B> for OdeFunc<B> {
    fn evaluate(&self, t: f64, z: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(t, z)
    }
}
