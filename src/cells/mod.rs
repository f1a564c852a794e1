//! # Recurrent Cell Implementations
//!
//! Single-timestep cells used by the sequence encoder. They are wrapped by the
//! runners in [`crate::rnn`], which handle step iteration and state.
//!
//! ## Cell Types
//!
//! | Cell | Encoder variant | Input width |
//! |------|-----------------|-------------|
//! | [`GruCell`] | `dense-gated` | features + elapsed time |
//! | [`GrudCell`] | `missing-aware` | features (elapsed time drives the decays) |
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `input` | `[batch, input_size]` | Input features |
//! | `hidden` | `[batch, hidden_size]` | Previous hidden state |
//! | returned | `[batch, hidden_size]` | Updated hidden state |
//!
//! ## Example: Using GruCell Directly
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use odevae::cells::GruCell;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//! let cell = GruCell::<Backend>::new(4, 16, &device);
//!
//! let input = Tensor::<Backend, 2>::zeros([2, 4], &device);
//! let hidden = Tensor::<Backend, 2>::zeros([2, 16], &device);
//! let hidden = cell.forward(input, hidden);
//! assert_eq!(hidden.dims(), [2, 16]);
//! ```

pub mod gru_cell;
pub mod grud_cell;

pub use gru_cell::GruCell;
pub use grud_cell::{GrudCell, GrudStep};
