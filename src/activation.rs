//! Smooth activations for the latent vector field.
//!
//! The vector field must be differentiable everywhere so that both the
//! integrator and backpropagation see a well-behaved derivative. Only smooth
//! nonlinearities are offered.

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

/// LeCun's scaled tanh: `f(x) = 1.7159 * tanh(0.666 * x)`.
///
/// Approximately the identity near the origin with outputs in roughly
/// `[-1.7159, 1.7159]`.
///
/// ```rust
/// use burn::backend::NdArray;
/// use burn::tensor::Tensor;
/// use odevae::activation::LeCun;
///
/// type Backend = NdArray<f32>;
/// let device = Default::default();
///
/// let x = Tensor::<Backend, 1>::from_floats([0.0, 1.0, -1.0], &device);
/// let y = LeCun::forward(x);
/// assert_eq!(y.dims(), [3]);
/// ```
pub struct LeCun;

impl LeCun {
    pub fn forward<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
        (x * 0.666f32).tanh() * 1.7159f32
    }
}

/// Nonlinearity applied between the hidden layers of the vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldActivation {
    /// `tanh(x)`
    #[default]
    Tanh,
    /// `1.7159 * tanh(0.666 x)`
    LeCun,
    /// `ln(1 + e^x)`
    Softplus,
}

impl FieldActivation {
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            FieldActivation::Tanh => x.tanh(),
            FieldActivation::LeCun => LeCun::forward(x),
            // log1p(exp(x)) overflows for large x; use max(x, 0) + log1p(exp(-|x|))
            FieldActivation::Softplus => {
                let positive = x.clone().clamp_min(0.0);
                let tail = x.abs().neg().exp().log1p();
                positive + tail
            }
        }
    }
}
