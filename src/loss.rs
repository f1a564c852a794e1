//! Training objective and evaluation metrics.
//!
//! Every function takes the device first. Only [`differentiable_smape`]
//! materializes a new tensor with it; the others accept it so that all
//! metrics share one calling convention.
//!
//! All functions return a single-element rank-1 tensor.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Negative evidence lower bound averaged over the batch.
///
/// ```text
/// recon = 0.5 * sum_{t, f} (x - x_p)^2
/// kl    = -0.5 * sum_l (1 + logvar - mu^2 - exp(logvar))
/// loss  = mean_batch(recon + kl)
/// ```
///
/// `x_p` and `x` are `[steps, batch, features]`; `mu` and `logvar` are
/// `[batch, latent]`. `z` is accepted for call-site symmetry and unused.
pub fn vae_loss<B: Backend>(
    _device: &B::Device,
    x_p: Tensor<B, 3>,
    x: Tensor<B, 3>,
    _z: Tensor<B, 2>,
    mu: Tensor<B, 2>,
    logvar: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let [_, batch, _] = x.dims();

    let reconstruction = (x - x_p)
        .powf_scalar(2.0)
        .sum_dim(2)
        .sum_dim(0)
        .reshape([batch])
        .mul_scalar(0.5);

    let kl = (logvar.clone().add_scalar(1.0) - mu.powf_scalar(2.0) - logvar.exp())
        .sum_dim(1)
        .reshape([batch])
        .mul_scalar(-0.5);

    (reconstruction + kl).mean()
}

/// Mean absolute percentage error, in percent.
///
/// Zero targets are not guarded and yield infinities or NaN.
pub fn mape<B: Backend, const D: usize>(
    _device: &B::Device,
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
) -> Tensor<B, 1> {
    (y_pred - y_true.clone()).abs().div(y_true).mean().mul_scalar(100.0)
}

/// SMAPE with an epsilon-stabilized denominator, usable as a training loss.
///
/// `mean(2 * |p - t| / max(|t| + |p| + eps, 0.5 + eps))`
pub fn differentiable_smape<B: Backend, const D: usize>(
    device: &B::Device,
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
    epsilon: f64,
) -> Tensor<B, 1> {
    let floor = Tensor::<B, D>::full(y_true.shape(), 0.5 + epsilon, device);
    let summ = (y_true.clone().abs() + y_pred.clone().abs())
        .add_scalar(epsilon)
        .max_pair(floor);

    (y_pred - y_true).abs().div(summ).mul_scalar(2.0).mean()
}

/// Kaggle SMAPE in percent: `200 * mean(|p - t| / (|t| + |p|))`.
///
/// Elements where `|t| + |p| == 0` contribute zero error.
pub fn kaggle_smape<B: Backend, const D: usize>(
    _device: &B::Device,
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
) -> Tensor<B, 1> {
    let summ = y_true.clone().abs() + y_pred.clone().abs();
    guarded_ratio((y_pred - y_true).abs(), summ).mean().mul_scalar(200.0)
}

/// [`kaggle_smape`] with both series rounded to the nearest integer in the
/// numerator. The denominator uses the unrounded values.
pub fn rounded_smape<B: Backend, const D: usize>(
    _device: &B::Device,
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
) -> Tensor<B, 1> {
    let summ = y_true.clone().abs() + y_pred.clone().abs();
    let numerator = (y_pred.round() - y_true.round()).abs();
    guarded_ratio(numerator, summ).mean().mul_scalar(200.0)
}

/// Mean absolute error in `log1p` space, optionally weighted per element.
pub fn mae<B: Backend, const D: usize>(
    _device: &B::Device,
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
    weights: Option<Tensor<B, D>>,
) -> Tensor<B, 1> {
    let error = (y_true.log1p() - y_pred.log1p()).abs();
    weighted(error, weights).mean()
}

/// Mean squared error in `log1p` space, optionally weighted per element.
pub fn mse<B: Backend, const D: usize>(
    _device: &B::Device,
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
    weights: Option<Tensor<B, D>>,
) -> Tensor<B, 1> {
    let error = (y_true.log1p() - y_pred.log1p()).powf_scalar(2.0);
    weighted(error, weights).mean()
}

/// `numerator / denominator`, with zero wherever the denominator is zero.
fn guarded_ratio<B: Backend, const D: usize>(
    numerator: Tensor<B, D>,
    denominator: Tensor<B, D>,
) -> Tensor<B, D> {
    let zero = denominator.clone().equal_elem(0.0);
    numerator
        .div(denominator.mask_fill(zero.clone(), 1.0))
        .mask_fill(zero, 0.0)
}

fn weighted<B: Backend, const D: usize>(error: Tensor<B, D>, weights: Option<Tensor<B, D>>) -> Tensor<B, D> {
    match weights {
        Some(w) => error.mul(w),
        None => error,
    }
}
