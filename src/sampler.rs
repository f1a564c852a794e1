//! Reparameterized sampling from the latent Gaussian.

use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};

/// Draw `z = mu + exp(0.5 * logvar) * eps` with fresh `eps ~ N(0, 1)`.
///
/// The noise is exogenous, so gradients flow into `mu` and `logvar`.
pub fn reparameterize<B: Backend>(mu: Tensor<B, 2>, logvar: Tensor<B, 2>) -> Tensor<B, 2> {
    let std = logvar.mul_scalar(0.5).exp();
    let eps = Tensor::random(mu.shape(), Distribution::Normal(0.0, 1.0), &mu.device());
    mu + std * eps
}

/// Latent sample, or `mu` itself when `map` is set.
pub fn sample<B: Backend>(mu: Tensor<B, 2>, logvar: Tensor<B, 2>, map: bool) -> Tensor<B, 2> {
    if map {
        mu
    } else {
        reparameterize(mu, logvar)
    }
}
