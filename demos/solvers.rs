//! Compare latent integrators on the same decoder
//!
//! Decodes one latent state with each integrator and reports how far the
//! each scheme drifts from a fine-grained RK4 reference.

use std::time::Instant;

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use odevae::prelude::*;

type Backend = NdArray<f32>;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Integrator Comparison ===\n");
    let device = Default::default();

    let decoder = NeuralOdeDecoder::<Backend>::new(3, 32, 8, &device).with_field(
        32,
        true,
        FieldActivation::LeCun,
        &device,
    );
    let z0 = Tensor::<Backend, 2>::random([4, 8], Distribution::Normal(0.0, 1.0), &device);
    let times: Vec<f64> = [0.0, 0.2, 0.25, 0.9, 1.7, 2.0, 3.5].to_vec();

    let reference = decoder.decode_with(z0.clone(), &times, &Rk4::new(1e-3)?)?;

    let candidates: Vec<(String, Box<dyn Integrator<Backend>>)> = vec![
        ("euler h=0.1".into(), Box::new(Euler::new(0.1)?)),
        ("euler h=0.01".into(), Box::new(Euler::new(0.01)?)),
        ("rk4 h=0.1".into(), Box::new(Rk4::new(0.1)?)),
        ("dopri5 default".into(), Box::new(Dopri5::default())),
    ];

    println!("{:<16} {:>12} {:>10}", "integrator", "max |err|", "time");
    for (label, solver) in &candidates {
        let start = Instant::now();
        let x_hat = decoder.decode_with(z0.clone(), &times, solver.as_ref())?;
        let elapsed = start.elapsed();

        let err = (x_hat - reference.clone()).abs().max().into_scalar();
        println!("{:<16} {:>12.2e} {:>10.2?}", label, err, elapsed);
    }

    Ok(())
}
