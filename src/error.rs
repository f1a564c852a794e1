//! Error types for model construction, forward passes and integration.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OdeVaeError>;

/// Every failure the model can surface.
///
/// | Category | Variants | Raised |
/// |----------|----------|--------|
/// | Configuration | InvalidConfiguration, InvalidParameter | construction, forward on an inconsistent variant |
/// | Input | ShapeMismatch | forward, encode, decode |
/// | Numerics | IntegrationFailed, NonFiniteLoss | decoder integration, training step |
/// | Host transfer | TensorData | reading query times back from a tensor |
#[derive(Debug, Error)]
pub enum OdeVaeError {
    /// Unrecognized encoder variant name.
    #[error("Invalid encoder: {value:?}, allowed encoders: {{{allowed}}}")]
    InvalidConfiguration { value: String, allowed: String },

    /// A numeric construction parameter is out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Tensor dimensions disagree with each other or with the model.
    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    /// The integrator could not advance the latent state.
    #[error("{solver} integration failed at t={time}: {reason}")]
    IntegrationFailed {
        solver: &'static str,
        time: f64,
        reason: String,
    },

    /// Loss evaluated to NaN or infinity; the update was skipped.
    #[error("Non-finite loss {value} at step {step}")]
    NonFiniteLoss { step: usize, value: f64 },

    /// Tensor contents could not be read back to the host.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

impl OdeVaeError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn shape_mismatch(
        what: &'static str,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        Self::ShapeMismatch {
            what,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}
