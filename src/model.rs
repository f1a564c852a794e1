//! The composed ODE variational autoencoder.

use crate::activation::FieldActivation;
use crate::decoder::NeuralOdeDecoder;
use crate::encoder::{EncoderKind, RecurrentEncoder};
use crate::error::OdeVaeError;
use crate::ode::SolverConfig;
use crate::sampler;
use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use tracing::debug;

/// Construction parameters for [`OdeVae`]
#[derive(Config, Debug)]
pub struct OdeVaeConfig {
    /// Observation feature count
    pub output_dim: usize,
    /// Width of the recurrent state, vector field and decoder hidden layer
    pub hidden_dim: usize,
    /// Latent dimension
    pub latent_dim: usize,
    /// Encoder variant name, one of `dense-gated` or `missing-aware`
    pub encoder: String,
    /// Latent integrator
    #[config(default = "SolverConfig::Euler { max_step: 0.05 }")]
    pub solver: SolverConfig,
    /// Vector field nonlinearity
    #[config(default = "FieldActivation::Tanh")]
    pub activation: FieldActivation,
    /// Whether the vector field ignores time
    #[config(default = true)]
    pub time_invariant: bool,
}

impl OdeVaeConfig {
    /// Validate and build the model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> crate::error::Result<OdeVae<B>> {
        for (name, value) in [
            ("output_dim", self.output_dim),
            ("hidden_dim", self.hidden_dim),
            ("latent_dim", self.latent_dim),
        ] {
            if value == 0 {
                return Err(OdeVaeError::invalid_parameter(name, "must be greater than zero"));
            }
        }
        let kind: EncoderKind = self.encoder.parse()?;
        self.solver.validate()?;

        let encoder = RecurrentEncoder::with_kind(
            self.output_dim,
            self.hidden_dim,
            self.latent_dim,
            kind,
            device,
        );
        let decoder = NeuralOdeDecoder::new(self.output_dim, self.hidden_dim, self.latent_dim, device)
            .with_field(self.hidden_dim, self.time_invariant, self.activation, device)
            .with_solver(self.solver);

        debug!(
            output_dim = self.output_dim,
            hidden_dim = self.hidden_dim,
            latent_dim = self.latent_dim,
            encoder = %kind,
            solver = ?self.solver,
            "built ODE-VAE"
        );

        Ok(OdeVae {
            encoder,
            decoder,
            latent_dim: self.latent_dim,
        })
    }
}

/// Result of one forward pass.
#[derive(Debug, Clone)]
pub struct OdeVaeOutput<B: Backend> {
    /// Reconstruction `[decoder_steps, batch, output_dim]`
    pub x_hat: Tensor<B, 3>,
    /// Latent initial state actually decoded `[batch, latent_dim]`
    pub z: Tensor<B, 2>,
    /// Latent mean `[batch, latent_dim]`
    pub mu: Tensor<B, 2>,
    /// Latent log-variance `[batch, latent_dim]`
    pub logvar: Tensor<B, 2>,
}

/// Variational autoencoder with Neural ODE latent dynamics
///
/// ```rust
/// use burn::backend::NdArray;
/// use burn::tensor::Tensor;
/// use odevae::model::OdeVaeConfig;
///
/// type Backend = NdArray<f32>;
/// let device = Default::default();
///
/// let model = OdeVaeConfig::new(3, 8, 4, "dense-gated".to_string())
///     .init::<Backend>(&device)
///     .unwrap();
///
/// let x = Tensor::<Backend, 3>::zeros([5, 2, 3], &device);
/// let t_enc = Tensor::<Backend, 3>::zeros([5, 2, 1], &device);
/// let t_dec = Tensor::<Backend, 3>::zeros([7, 2, 1], &device);
///
/// let out = model.forward(x, t_enc, t_dec, false).unwrap();
/// assert_eq!(out.x_hat.dims(), [7, 2, 3]);
/// ```
#[derive(Module, Debug)]
pub struct OdeVae<B: Backend> {
    encoder: RecurrentEncoder<B>,
    decoder: NeuralOdeDecoder<B>,
    #[module(skip)]
    latent_dim: usize,
}

impl<B: Backend> OdeVae<B> {
    /// Shorthand for [`OdeVaeConfig`] with default solver and field.
    pub fn new(
        output_dim: usize,
        hidden_dim: usize,
        latent_dim: usize,
        encoder: &str,
        device: &B::Device,
    ) -> crate::error::Result<Self> {
        OdeVaeConfig::new(output_dim, hidden_dim, latent_dim, encoder.to_string()).init(device)
    }

    pub fn encoder(&self) -> &RecurrentEncoder<B> {
        &self.encoder
    }

    pub fn decoder(&self) -> &NeuralOdeDecoder<B> {
        &self.decoder
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// Encode, sample (or take the mean when `map` is set) and decode
    ///
    /// # Arguments
    /// * `x` - Observations `[encoder_steps, batch, output_dim]`
    /// * `t_encoder` - Observation times `[encoder_steps, batch, 1]`
    /// * `t_decoder` - Query times `[decoder_steps, batch, 1]`
    /// * `map` - Skip sampling and decode `mu`
    pub fn forward(
        &self,
        x: Tensor<B, 3>,
        t_encoder: Tensor<B, 3>,
        t_decoder: Tensor<B, 3>,
        map: bool,
    ) -> crate::error::Result<OdeVaeOutput<B>> {
        let (mu, logvar) = self.encoder.forward(x, t_encoder)?;
        let z = sampler::sample(mu.clone(), logvar.clone(), map);
        let x_hat = self.decoder.forward(z.clone(), t_decoder)?;

        Ok(OdeVaeOutput { x_hat, z, mu, logvar })
    }

    /// Deterministic reconstruction through the latent mean.
    pub fn reconstruct(
        &self,
        x: Tensor<B, 3>,
        t_encoder: Tensor<B, 3>,
        t_decoder: Tensor<B, 3>,
    ) -> crate::error::Result<Tensor<B, 3>> {
        Ok(self.forward(x, t_encoder, t_decoder, true)?.x_hat)
    }

    /// Decode a given latent state at arbitrary times, e.g. to forecast.
    pub fn generate(&self, z0: Tensor<B, 2>, times: &[f64]) -> crate::error::Result<Tensor<B, 3>> {
        let [_, latent] = z0.dims();
        if latent != self.latent_dim {
            return Err(OdeVaeError::shape_mismatch("latent state", self.latent_dim, latent));
        }
        self.decoder.decode_with(z0, times, &self.decoder.solver())
    }
}
