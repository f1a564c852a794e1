//! Properties of the objective and evaluation metrics

use burn::backend::{Autodiff, NdArray};
use burn::tensor::{Distribution, Tensor, TensorData};
use odevae::loss::{differentiable_smape, kaggle_smape, mae, mse, rounded_smape, vae_loss};

type Backend = NdArray<f32>;

fn vector(values: &[f32]) -> Tensor<Backend, 1> {
    Tensor::from_data(TensorData::new(values.to_vec(), [values.len()]), &Default::default())
}

#[test]
fn test_kaggle_smape_is_symmetric_and_bounded() {
    let device = Default::default();
    let a = Tensor::<Backend, 2>::random([6, 4], Distribution::Uniform(-3.0, 3.0), &device);
    let b = Tensor::<Backend, 2>::random([6, 4], Distribution::Uniform(-3.0, 3.0), &device);

    let ab = kaggle_smape(&device, a.clone(), b.clone()).into_scalar();
    let ba = kaggle_smape(&device, b, a).into_scalar();
    assert!((ab - ba).abs() < 1e-3);
    assert!((0.0..=200.0).contains(&ab));
}

#[test]
fn test_kaggle_smape_opposite_signs_is_maximal() {
    let device = Default::default();
    let loss = kaggle_smape(&device, vector(&[1.0, -2.0]), vector(&[-1.0, 2.0])).into_scalar();
    assert!((loss - 200.0).abs() < 1e-3);
}

#[test]
fn test_rounded_and_kaggle_agree_on_integer_grid() {
    let device = Default::default();
    let y_true = Tensor::<Backend, 2>::from_data(
        TensorData::new(vec![0.0f32, 3.0, 7.0, 2.0, 0.0, 11.0], [2, 3]),
        &device,
    );
    let y_pred = Tensor::<Backend, 2>::from_data(
        TensorData::new(vec![1.0f32, 3.0, 5.0, 0.0, 0.0, 12.0], [2, 3]),
        &device,
    );

    let rounded = rounded_smape(&device, y_true.clone(), y_pred.clone()).into_scalar();
    let kaggle = kaggle_smape(&device, y_true, y_pred).into_scalar();
    assert!((rounded - kaggle).abs() < 1e-4);
}

#[test]
fn test_differentiable_smape_has_gradient_at_zero() {
    type TrainBackend = Autodiff<NdArray<f32>>;
    let device = Default::default();

    let y_true = Tensor::<TrainBackend, 1>::zeros([3], &device);
    let y_pred = Tensor::<TrainBackend, 1>::from_floats([0.0, 0.1, -0.2], &device).require_grad();

    let loss = differentiable_smape(&device, y_true, y_pred.clone(), 0.1);
    let grads = loss.backward();
    let grad = y_pred.grad(&grads).expect("prediction gradient");

    let values = grad.into_data().to_vec::<f32>().unwrap();
    assert!(values.iter().all(|v| v.is_finite()));
    // Positive error pushes up, negative error pushes down
    assert!(values[1] > 0.0);
    assert!(values[2] < 0.0);
}

#[test]
fn test_weighted_log_errors_scale_linearly() {
    let device = Default::default();
    let y_true = vector(&[1.0, 3.0, 0.5]);
    let y_pred = vector(&[2.0, 1.0, 0.5]);

    let plain = mae(&device, y_true.clone(), y_pred.clone(), None).into_scalar();
    let doubled = mae(&device, y_true.clone(), y_pred.clone(), Some(vector(&[2.0, 2.0, 2.0]))).into_scalar();
    assert!((doubled - 2.0 * plain).abs() < 1e-5);

    let squared = mse(&device, y_true.clone(), y_pred.clone(), None).into_scalar();
    let expected = [(2.0f32.ln() - 3.0f32.ln()).powi(2), (4.0f32.ln() - 2.0f32.ln()).powi(2), 0.0];
    let expected = expected.iter().sum::<f32>() / 3.0;
    assert!((squared - expected).abs() < 1e-5);
}

#[test]
fn test_vae_loss_grows_with_posterior_spread() {
    let device = Default::default();
    let x = Tensor::<Backend, 3>::zeros([4, 2, 3], &device);
    let mu = Tensor::<Backend, 2>::zeros([2, 5], &device);

    let tight = vae_loss(
        &device,
        x.clone(),
        x.clone(),
        mu.clone(),
        mu.clone(),
        Tensor::zeros([2, 5], &device),
    )
    .into_scalar();
    let wide = vae_loss(
        &device,
        x.clone(),
        x,
        mu.clone(),
        mu,
        Tensor::full([2, 5], 2.0, &device),
    )
    .into_scalar();

    assert_eq!(tight, 0.0);
    // Per latent: -0.5 * (1 + 2 - e^2), summed over 5
    let expected = -0.5 * (3.0 - 2.0f32.exp()) * 5.0;
    assert!((wide - expected).abs() < 1e-4, "got {}", wide);
}
