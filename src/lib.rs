//! # odevae - ODE Variational Autoencoder (Rust)
//!
//! Latent continuous-time model for irregularly sampled sequences, built on
//! the Burn framework.
//!
//! ## Features
//!
//! - **Recurrent encoder**: Reads the sequence backwards in time and emits a
//!   Gaussian posterior over the latent initial state
//! - **Two encoder variants**: `dense-gated` (GRU) and `missing-aware`
//!   (GRU-D, NaN entries are missing observations)
//! - **Neural ODE decoder**: Integrates a learned latent vector field and
//!   projects each query time back to observation space
//! - **Integrators**: Fixed-step Euler and RK4, adaptive Dormand-Prince
//! - **Losses**: Negative ELBO plus SMAPE, MAPE and log-space error metrics
//!
//! ## Quick Start
//!
//! ```rust
//! use odevae::prelude::*;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let model = OdeVae::<Backend>::new(3, 8, 4, "dense-gated", &device).unwrap();
//!
//! let x = Tensor::<Backend, 3>::zeros([5, 2, 3], &device);
//! let t_enc = Tensor::<Backend, 3>::zeros([5, 2, 1], &device);
//! let t_dec = Tensor::<Backend, 3>::zeros([7, 2, 1], &device);
//!
//! let out = model.forward(x.clone(), t_enc, t_dec, false).unwrap();
//! assert_eq!(out.x_hat.dims(), [7, 2, 3]);
//! assert_eq!(out.mu.dims(), [2, 4]);
//! ```
//!
//! ## Tensor Layout
//!
//! Sequences are step-major: observations are `[steps, batch, features]`
//! and times `[steps, batch, 1]`. Decoder query times are read from batch
//! element 0 and shared across the batch.
//!
//! ## Custom Integrators
//!
//! ```ignore
//! use odevae::ode::Dopri5;
//!
//! let solver = Dopri5::new(1e-5, 1e-6, 10_000, 1e-8)?;
//! let x_hat = model.decoder().decode_with(z0, &[0.0, 0.5, 1.0], &solver)?;
//! ```

pub mod activation;
pub mod cells;
pub mod data;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod loss;
pub mod model;
pub mod ode;
pub mod rnn;
pub mod sampler;
pub mod train;

pub mod prelude {
    pub use crate::activation::{FieldActivation, LeCun};
    pub use crate::cells::{GruCell, GrudCell, GrudStep};
    pub use crate::data::{SpiralBatch, SpiralConfig};
    pub use crate::decoder::NeuralOdeDecoder;
    pub use crate::encoder::{EncoderKind, RecurrentEncoder};
    pub use crate::error::{OdeVaeError, Result};
    pub use crate::model::{OdeVae, OdeVaeConfig, OdeVaeOutput};
    pub use crate::ode::{Dopri5, Euler, Integrator, OdeFunc, Rk4, SolverConfig, VectorField};
    pub use crate::rnn::{Gru, Grud};
    pub use crate::train::{evaluate, Evaluation, Trainer};
}
