//! Dense-gated sequence runner.
//!
//! Iterates a [`GruCell`] over a step-major sequence.

use crate::cells::GruCell;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// GRU layer over `[seq, batch, features]` input
#[derive(Module, Debug)]
pub struct Gru<B: Backend> {
    cell: GruCell<B>,
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
}

impl<B: Backend> Gru<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            cell: GruCell::new(input_size, hidden_size, device),
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
    /// * `input` - `[seq, batch, input_size]`
    /// * `state` - Optional initial hidden state `[batch, hidden_size]`, zeros if `None`
    ///
    /// # Returns
    /// Tuple of (outputs `[seq, batch, hidden_size]`, final state `[batch, hidden_size]`)
    pub fn forward(
        &self,
        input: Tensor<B, 3>,
        state: Option<Tensor<B, 2>>,
    ) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let device = input.device();
        let [seq_len, batch_size, _] = input.dims();

        let mut hidden =
            state.unwrap_or_else(|| Tensor::<B, 2>::zeros([batch_size, self.hidden_size], &device));

        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(seq_len);
        for t in 0..seq_len {
            // input[t, batch, features] -> [batch, features]
            let step_input = input.clone().narrow(0, t, 1).squeeze(0);
            hidden = self.cell.forward(step_input, hidden);
            outputs.push(hidden.clone());
        }

        (Tensor::stack(outputs, 0), hidden)
    }
}
