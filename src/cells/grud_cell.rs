//! GRU-D: gated recurrent unit with trainable decays for missing values.
//!
//! Reference: Che et al., "Recurrent Neural Networks for Multivariate Time
//! Series with Missing Values", Scientific Reports 2018.

use super::GruCell;
use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Per-step inputs of a [`GrudCell`]. All tensors are `[batch, input_size]`.
#[derive(Debug, Clone)]
pub struct GrudStep<B: Backend> {
    /// Observation with missing entries already zero-filled
    pub values: Tensor<B, 2>,
    /// 1 where the entry was observed, 0 where it was missing
    pub mask: Tensor<B, 2>,
    /// Time since each feature was last observed
    pub delta: Tensor<B, 2>,
    /// Last observed value of each feature
    pub last_observed: Tensor<B, 2>,
    /// Empirical mean of each feature over the sequence
    pub empirical_mean: Tensor<B, 2>,
}

/// Missing-aware GRU cell
///
/// Before the gated update the cell
/// - imputes missing inputs: `x = m*x + (1-m)*(γx*x_last + (1-γx)*x_mean)`
///   with `γx = exp(-relu(w_x ⊙ δ + b_x))` (diagonal decay)
/// - decays the carried state: `h = γh ⊙ h` with `γh = exp(-relu(W_h δ + b_h))`
///
/// and then runs a standard GRU update on `[x, m]`.
#[derive(Module, Debug)]
pub struct GrudCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    /// Diagonal input decay weight
    pub input_decay_w: Param<Tensor<B, 1>>,
    /// Input decay bias
    pub input_decay_b: Param<Tensor<B, 1>>,
    /// Full hidden decay map (delta -> hidden)
    hidden_decay: Linear<B>,
    /// Gated update over imputed values concatenated with the mask
    gru: GruCell<B>,
}

impl<B: Backend> GrudCell<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            input_size,
            hidden_size,
            input_decay_w: Param::from_tensor(Tensor::ones([input_size], device).mul_scalar(0.1)),
            input_decay_b: Param::from_tensor(Tensor::zeros([input_size], device)),
            hidden_decay: LinearConfig::new(input_size, hidden_size)
                .with_bias(true)
                .init(device),
            gru: GruCell::new(2 * input_size, hidden_size, device),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Imputed input `[batch, input_size]` for one step.
    pub fn impute(&self, step: &GrudStep<B>) -> Tensor<B, 2> {
        let decay_input = step
            .delta
            .clone()
            .mul(self.input_decay_w.val().unsqueeze::<2>())
            .add(self.input_decay_b.val().unsqueeze::<2>());
        let gamma_x = activation::relu(decay_input).neg().exp();

        let fallback = gamma_x.clone().mul(step.last_observed.clone())
            + gamma_x.neg().add_scalar(1.0).mul(step.empirical_mean.clone());

        let mask = step.mask.clone();
        mask.clone().mul(step.values.clone()) + mask.neg().add_scalar(1.0).mul(fallback)
    }

    /// Advance one step, returning the new hidden state `[batch, hidden_size]`.
    pub fn forward(&self, step: GrudStep<B>, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let imputed = self.impute(&step);

        let gamma_h = activation::relu(self.hidden_decay.forward(step.delta))
            .neg()
            .exp();
        let decayed = hidden.mul(gamma_h);

        let gru_input = Tensor::cat(vec![imputed, step.mask], 1);
        self.gru.forward(gru_input, decayed)
    }
}
