//! Single optimization steps and evaluation for [`OdeVae`].
//!
//! There is no epoch loop here. Callers own batching and scheduling and
//! call [`Trainer::step`] once per batch.

use crate::error::{OdeVaeError, Result};
use crate::loss;
use crate::model::OdeVae;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};
use tracing::{debug, warn};

/// Reconstruction quality of a MAP decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Negative ELBO with `z = mu`
    pub loss: f64,
    pub kaggle_smape: f64,
    /// Mean absolute error in observation space (not `log1p` like [`loss::mae`])
    pub abs_error: f64,
}

/// Holds a model and its optimizer state
pub struct Trainer<B: AutodiffBackend, O> {
    model: OdeVae<B>,
    optimizer: O,
    learning_rate: f64,
    steps: usize,
}

impl<B, O> Trainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<OdeVae<B>, B>,
{
    pub fn new(model: OdeVae<B>, optimizer: O, learning_rate: f64) -> Self {
        Self {
            model,
            optimizer,
            learning_rate,
            steps: 0,
        }
    }

    pub fn model(&self) -> &OdeVae<B> {
        &self.model
    }

    pub fn into_model(self) -> OdeVae<B> {
        self.model
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Forward, loss, backward and one optimizer update.
    ///
    /// A non-finite loss skips the update and is not counted in [`steps`](Self::steps).
    ///
    /// # Returns
    /// The loss before the update
    pub fn step(&mut self, x: Tensor<B, 3>, t_encoder: Tensor<B, 3>, t_decoder: Tensor<B, 3>) -> Result<f64> {
        let device = x.device();
        let out = self.model.forward(x.clone(), t_encoder, t_decoder, false)?;
        let loss = loss::vae_loss(&device, out.x_hat, x, out.z, out.mu, out.logvar);

        let value: f64 = loss.clone().into_scalar().elem();
        if !value.is_finite() {
            let step = self.steps + 1;
            warn!(step, value, "skipping update on non-finite loss");
            return Err(OdeVaeError::NonFiniteLoss { step, value });
        }

        let grads = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = self
            .optimizer
            .step(self.learning_rate, self.model.clone(), grads);
        self.steps += 1;

        debug!(step = self.steps, loss = value, "optimizer step");
        Ok(value)
    }
}

/// Score a MAP reconstruction against the observed sequence.
///
/// `t_decoder` must query the same steps as `x` for the comparison to align.
pub fn evaluate<B: Backend>(
    model: &OdeVae<B>,
    x: Tensor<B, 3>,
    t_encoder: Tensor<B, 3>,
    t_decoder: Tensor<B, 3>,
) -> Result<Evaluation> {
    let device = x.device();
    if t_decoder.dims()[0] != x.dims()[0] {
        return Err(OdeVaeError::shape_mismatch(
            "evaluation decoder steps",
            x.dims()[0],
            t_decoder.dims()[0],
        ));
    }

    let out = model.forward(x.clone(), t_encoder, t_decoder, true)?;
    let loss = loss::vae_loss(
        &device,
        out.x_hat.clone(),
        x.clone(),
        out.z,
        out.mu,
        out.logvar,
    );
    let smape = loss::kaggle_smape(&device, x.clone(), out.x_hat.clone());
    let abs_error = (x - out.x_hat).abs().mean();

    Ok(Evaluation {
        loss: loss.into_scalar().elem(),
        kaggle_smape: smape.into_scalar().elem(),
        abs_error: abs_error.into_scalar().elem(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpiralConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_steps_reduce_loss_on_fixed_batch() {
        let device = Default::default();
        let batch = SpiralConfig {
            sequences: 4,
            steps: 8,
            max_time: 2.0,
            ..SpiralConfig::default()
        }
        .generate()
        .unwrap();
        let (x, t) = batch.to_tensors::<TestBackend>(&device);

        let model = OdeVae::<TestBackend>::new(2, 16, 4, "dense-gated", &device).unwrap();
        let before = evaluate(&model, x.clone(), t.clone(), t.clone()).unwrap();

        let mut trainer = Trainer::new(model, AdamConfig::new().init(), 1e-2);
        for _ in 0..40 {
            trainer.step(x.clone(), t.clone(), t.clone()).unwrap();
        }
        assert_eq!(trainer.steps(), 40);

        let after = evaluate(trainer.model(), x.clone(), t.clone(), t).unwrap();
        assert!(
            after.loss < before.loss,
            "loss did not decrease: {} -> {}",
            before.loss,
            after.loss
        );
    }

    #[test]
    fn test_non_finite_loss_skips_update_and_count() {
        let device = Default::default();
        let model = OdeVae::<TestBackend>::new(2, 8, 3, "dense-gated", &device).unwrap();
        let mut trainer = Trainer::new(model, AdamConfig::new().init(), 1e-2);

        let t = Tensor::<TestBackend, 3>::zeros([4, 2, 1], &device);
        let poisoned = Tensor::<TestBackend, 3>::full([4, 2, 2], f32::NAN, &device);

        let result = trainer.step(poisoned, t.clone(), t.clone());
        assert!(matches!(result, Err(OdeVaeError::NonFiniteLoss { step: 1, .. })));
        assert_eq!(trainer.steps(), 0);

        let clean = Tensor::<TestBackend, 3>::ones([4, 2, 2], &device);
        assert!(trainer.step(clean, t.clone(), t).unwrap().is_finite());
        assert_eq!(trainer.steps(), 1);
    }

    #[test]
    fn test_evaluation_error_is_linear_space() {
        let device = Default::default();
        let model = OdeVae::<NdArray<f32>>::new(2, 8, 3, "dense-gated", &device).unwrap();

        let x = Tensor::<NdArray<f32>, 3>::ones([3, 2, 2], &device);
        let t = Tensor::<NdArray<f32>, 3>::zeros([3, 2, 1], &device);
        let x_hat = model.reconstruct(x.clone(), t.clone(), t.clone()).unwrap();
        let expected: f64 = (x.clone() - x_hat).abs().mean().into_scalar().elem();

        let report = evaluate(&model, x, t.clone(), t).unwrap();
        assert!((report.abs_error - expected).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_rejects_misaligned_steps() {
        let device = Default::default();
        let model = OdeVae::<NdArray<f32>>::new(2, 8, 3, "dense-gated", &device).unwrap();

        let x = Tensor::<NdArray<f32>, 3>::zeros([5, 2, 2], &device);
        let t_enc = Tensor::<NdArray<f32>, 3>::zeros([5, 2, 1], &device);
        let t_dec = Tensor::<NdArray<f32>, 3>::zeros([6, 2, 1], &device);

        assert!(evaluate(&model, x, t_enc, t_dec).is_err());
    }
}
