//! Basic usage of the ODE-VAE
//!
//! Builds both encoder variants, runs a forward pass on a small irregular
//! batch and prints the shapes and the training objective.

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor, TensorData};
use odevae::loss::vae_loss;
use odevae::prelude::*;

type Backend = NdArray<f32>;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== ODE-VAE Basic Example ===\n");
    let device = Default::default();

    // Irregular observation times shared by both sequences
    let stamps = [0.0f32, 0.3, 0.45, 1.1, 1.6];
    let t_data: Vec<f32> = stamps.iter().flat_map(|&t| [t, t]).collect();
    let t = Tensor::<Backend, 3>::from_data(TensorData::new(t_data, [5, 2, 1]), &device);
    let x = Tensor::<Backend, 3>::random([5, 2, 3], Distribution::Uniform(-1.0, 1.0), &device);

    // Example 1: dense-gated encoder
    println!("Example 1: dense-gated encoder");
    let model = OdeVae::<Backend>::new(3, 16, 4, "dense-gated", &device)?;
    let out = model.forward(x.clone(), t.clone(), t.clone(), false)?;

    println!("  x shape:      {:?}", x.dims());
    println!("  x_hat shape:  {:?}", out.x_hat.dims());
    println!("  mu shape:     {:?}", out.mu.dims());

    let loss = vae_loss(&device, out.x_hat, x.clone(), out.z, out.mu, out.logvar);
    println!("  negative ELBO: {:.4}", loss.into_scalar());
    println!();

    // Example 2: missing-aware encoder with gaps in the observations
    println!("Example 2: missing-aware encoder with NaN gaps");
    let values: Vec<f32> = x
        .clone()
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| format!("{err:?}"))?
        .into_iter()
        .enumerate()
        .map(|(i, v)| if i % 4 == 1 { f32::NAN } else { v })
        .collect();
    let gappy = Tensor::<Backend, 3>::from_data(TensorData::new(values, [5, 2, 3]), &device);

    let model = OdeVae::<Backend>::new(3, 16, 4, "missing-aware", &device)?;
    let x_hat = model.reconstruct(gappy, t.clone(), t)?;
    println!("  reconstruction shape: {:?}", x_hat.dims());
    println!();

    // Example 3: unknown variant names are rejected up front
    println!("Example 3: invalid encoder name");
    match OdeVae::<Backend>::new(3, 16, 4, "transformer", &device) {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(err) => println!("  error: {err}"),
    }

    Ok(())
}
