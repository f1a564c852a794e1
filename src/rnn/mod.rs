//! # Sequence Runners
//!
//! Layers that drive a recurrent cell across a whole step-major sequence and
//! hand back the final hidden summary. The encoder in [`crate::encoder`]
//! selects one of them at construction time.
//!
//! | Layer | Cell | Input |
//! |-------|------|-------|
//! | [`Gru`] | [`GruCell`](crate::cells::GruCell) | `[seq, batch, features + 1]`, all columns fed to the cell |
//! | [`Grud`] | [`GrudCell`](crate::cells::GrudCell) | `[seq, batch, features + 1]`, last column drives the decays |
//!
//! Both return `(outputs, final_state)` with outputs `[seq, batch, hidden]`
//! and final state `[batch, hidden]`. The final state always equals the
//! output of the last processed step.
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use odevae::rnn::Gru;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let gru = Gru::<Backend>::new(4, 16, &device);
//! let input = Tensor::<Backend, 3>::zeros([10, 2, 4], &device);
//! let (outputs, state) = gru.forward(input, None);
//! assert_eq!(outputs.dims(), [10, 2, 16]);
//! assert_eq!(state.dims(), [2, 16]);
//! ```

pub mod gru;
pub mod grud;

pub use gru::Gru;
pub use grud::Grud;
