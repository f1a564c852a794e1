//! Missing-aware sequence runner.
//!
//! Consumes the same `[seq, batch, features + 1]` layout as the dense runner
//! (observations followed by one elapsed-time column) but hands the cell only
//! the observation width. NaN entries are treated as missing.

use crate::cells::{GrudCell, GrudStep};
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// GRU-D layer over `[seq, batch, input_size + 1]` input
#[derive(Module, Debug)]
pub struct Grud<B: Backend> {
    cell: GrudCell<B>,
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
}

impl<B: Backend> Grud<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            cell: GrudCell::new(input_size, hidden_size, device),
            input_size,
            hidden_size,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `input` - `[seq, batch, input_size + 1]`, last column is the per-step elapsed time
    ///
    /// # Returns
    /// Tuple of (outputs `[seq, batch, hidden_size]`, final state `[batch, hidden_size]`)
    pub fn forward(&self, input: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let device = input.device();
        let [seq_len, batch_size, _] = input.dims();
        let features = self.input_size;

        let raw = input.clone().narrow(2, 0, features);
        let elapsed = input.narrow(2, features, 1);

        let missing = raw.clone().is_nan();
        let mask = missing.clone().bool_not().float();
        let values = raw.mask_fill(missing, 0.0);

        // Mean over observed steps; features never observed fall back to 0
        let observed_count: Tensor<B, 2> = mask.clone().sum_dim(0).squeeze(0);
        let empirical_mean: Tensor<B, 2> = values
            .clone()
            .sum_dim(0)
            .squeeze::<2>(0)
            .div(observed_count.clamp_min(1.0));

        let mut hidden = Tensor::<B, 2>::zeros([batch_size, self.hidden_size], &device);
        let mut delta = Tensor::<B, 2>::zeros([batch_size, features], &device);
        let mut last_observed = empirical_mean.clone();

        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(seq_len);
        for t in 0..seq_len {
            let step_values: Tensor<B, 2> = values.clone().narrow(0, t, 1).squeeze(0);
            let step_mask: Tensor<B, 2> = mask.clone().narrow(0, t, 1).squeeze(0);

            if t > 0 {
                // Row t-1 carries the gap between steps t-1 and t
                let gap: Tensor<B, 2> = elapsed.clone().narrow(0, t - 1, 1).squeeze(0);
                let prev_mask: Tensor<B, 2> = mask.clone().narrow(0, t - 1, 1).squeeze(0);
                delta = gap.abs().expand([batch_size, features])
                    + prev_mask.neg().add_scalar(1.0).mul(delta);
            }

            let step = GrudStep {
                values: step_values.clone(),
                mask: step_mask.clone(),
                delta: delta.clone(),
                last_observed: last_observed.clone(),
                empirical_mean: empirical_mean.clone(),
            };
            hidden = self.cell.forward(step, hidden);
            outputs.push(hidden.clone());

            last_observed = step_mask.clone().mul(step_values)
                + step_mask.neg().add_scalar(1.0).mul(last_observed);
        }

        (Tensor::stack(outputs, 0), hidden)
    }
}
