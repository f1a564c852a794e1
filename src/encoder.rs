//! Recurrent encoder: observed sequence to latent Gaussian parameters.
//!
//! The encoder augments every observation with an elapsed-time feature,
//! reverses the sequence so the most recent step is consumed first, runs one
//! of two recurrent cores and projects the final hidden state to
//! `(mu, logvar)`.

use crate::error::{OdeVaeError, Result};
use crate::rnn::{Gru, Grud};
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Recurrent core used to summarize the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncoderKind {
    /// Standard GRU over observations plus the elapsed-time column
    #[serde(rename = "dense-gated")]
    DenseGated,
    /// GRU-D over the observation width, driven by elapsed time and NaN masks
    #[serde(rename = "missing-aware")]
    MissingAware,
}

impl EncoderKind {
    pub const ALLOWED: [EncoderKind; 2] = [EncoderKind::DenseGated, EncoderKind::MissingAware];

    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderKind::DenseGated => "dense-gated",
            EncoderKind::MissingAware => "missing-aware",
        }
    }

    /// Comma-separated list of accepted names.
    pub fn allowed_names() -> String {
        Self::ALLOWED
            .iter()
            .map(EncoderKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn invalid(value: impl Into<String>) -> OdeVaeError {
        OdeVaeError::InvalidConfiguration {
            value: value.into(),
            allowed: Self::allowed_names(),
        }
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncoderKind {
    type Err = OdeVaeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALLOWED
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Self::invalid(s))
    }
}

/// Elapsed-time feature for a `[steps, batch, 1]` time tensor.
///
/// `out[0] = 0` and `out[i] = t[i-1] - t[i]` for `i >= 1`, so increasing
/// timestamps produce non-positive offsets: `[0, 1, 3, 6]` becomes
/// `[0, -1, -2, -3]`.
pub fn elapsed_time<B: Backend>(t: Tensor<B, 3>) -> Tensor<B, 3> {
    let [steps, batch, width] = t.dims();
    let first = Tensor::<B, 3>::zeros([1, batch, width], &t.device());
    if steps < 2 {
        return first;
    }

    let previous = t.clone().narrow(0, 0, steps - 1);
    let current = t.narrow(0, 1, steps - 1);
    Tensor::cat(vec![first, previous - current], 0)
}

/// Sequence encoder producing the latent Gaussian `(mu, logvar)`
#[derive(Module, Debug)]
pub struct RecurrentEncoder<B: Backend> {
    /// Present only for [`EncoderKind::DenseGated`]
    dense: Option<Gru<B>>,
    /// Present only for [`EncoderKind::MissingAware`]
    missing: Option<Grud<B>>,
    /// Hidden summary to `2 * latent_dim`
    hid2lat: Linear<B>,
    kind: Ignored<EncoderKind>,
    #[module(skip)]
    input_dim: usize,
    #[module(skip)]
    hidden_dim: usize,
    #[module(skip)]
    latent_dim: usize,
}

impl<B: Backend> RecurrentEncoder<B> {
    /// Create an encoder, resolving `encoder` to a variant name.
    ///
    /// Fails with [`OdeVaeError::InvalidConfiguration`] for unknown names.
    pub fn new(
        input_dim: usize,
        hidden_dim: usize,
        latent_dim: usize,
        encoder: &str,
        device: &B::Device,
    ) -> Result<Self> {
        let kind: EncoderKind = encoder.parse()?;
        Ok(Self::with_kind(input_dim, hidden_dim, latent_dim, kind, device))
    }

    pub fn with_kind(
        input_dim: usize,
        hidden_dim: usize,
        latent_dim: usize,
        kind: EncoderKind,
        device: &B::Device,
    ) -> Self {
        let (dense, missing) = match kind {
            EncoderKind::DenseGated => (Some(Gru::new(input_dim + 1, hidden_dim, device)), None),
            EncoderKind::MissingAware => (None, Some(Grud::new(input_dim, hidden_dim, device))),
        };
        debug!(%kind, input_dim, hidden_dim, latent_dim, "built recurrent encoder");

        Self {
            dense,
            missing,
            hid2lat: LinearConfig::new(hidden_dim, 2 * latent_dim)
                .with_bias(true)
                .init(device),
            kind: Ignored(kind),
            input_dim,
            hidden_dim,
            latent_dim,
        }
    }

    pub fn kind(&self) -> EncoderKind {
        *self.kind
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// Encode a sequence
    ///
    /// # Arguments
    /// * `x` - Observations `[steps, batch, input_dim]`
    /// * `t` - Timestamps `[steps, batch, 1]`
    ///
    /// # Returns
    /// `(mu, logvar)`, each `[batch, latent_dim]`
    pub fn forward(&self, x: Tensor<B, 3>, t: Tensor<B, 3>) -> Result<(Tensor<B, 2>, Tensor<B, 2>)> {
        let [steps, batch, features] = x.dims();
        if steps == 0 {
            return Err(OdeVaeError::invalid_parameter(
                "x",
                "sequence needs at least one time step",
            ));
        }
        if features != self.input_dim {
            return Err(OdeVaeError::shape_mismatch(
                "observation features",
                self.input_dim,
                features,
            ));
        }
        if t.dims() != [steps, batch, 1] {
            return Err(OdeVaeError::shape_mismatch(
                "encoder timestamps",
                [steps, batch, 1],
                t.dims(),
            ));
        }

        // Most recent step first
        let xt = Tensor::cat(vec![x, elapsed_time(t)], 2).flip([0]);

        let hidden = match (*self.kind, &self.dense, &self.missing) {
            (EncoderKind::DenseGated, Some(gru), _) => gru.forward(xt, None).1,
            (EncoderKind::MissingAware, _, Some(grud)) => grud.forward(xt).1,
            (kind, _, _) => return Err(EncoderKind::invalid(kind.as_str())),
        };

        let z0 = self.hid2lat.forward(hidden);
        let mu = z0.clone().narrow(1, 0, self.latent_dim);
        let logvar = z0.narrow(1, self.latent_dim, self.latent_dim);
        Ok((mu, logvar))
    }
}
