//! Tests for vector field activations

use burn::backend::NdArray;
use burn::tensor::Tensor;
use odevae::activation::{FieldActivation, LeCun};

type Backend = NdArray<f32>;

#[test]
fn test_lecun_tanh_saturation() {
    let device = Default::default();

    let y_pos = LeCun::forward(Tensor::<Backend, 1>::full([1], 100.0f32, &device));
    assert!(y_pos.into_scalar() > 1.7);

    let y_neg = LeCun::forward(Tensor::<Backend, 1>::full([1], -100.0f32, &device));
    assert!(y_neg.into_scalar() < -1.7);
}

#[test]
fn test_field_activation_values() {
    let device = Default::default();
    let values = [-30.0f32, -2.0, -0.5, 0.0, 0.5, 2.0, 30.0];

    for &val in &values {
        let x = || Tensor::<Backend, 1>::full([1], val, &device);

        let tanh = FieldActivation::Tanh.apply(x()).into_scalar();
        assert!((tanh - val.tanh()).abs() < 1e-6, "tanh at x={}", val);

        let lecun = FieldActivation::LeCun.apply(x()).into_scalar();
        let expected = 1.7159f32 * (0.666f32 * val).tanh();
        assert!((lecun - expected).abs() < 1e-5, "lecun at x={}", val);

        let softplus = FieldActivation::Softplus.apply(x()).into_scalar();
        let expected = (val as f64).exp().ln_1p() as f32;
        assert!(
            (softplus - expected).abs() < 1e-4,
            "softplus at x={}: got {}, expected {}",
            val,
            softplus,
            expected
        );
    }
}

#[test]
fn test_softplus_stays_finite_for_large_inputs() {
    let device = Default::default();
    let x = Tensor::<Backend, 1>::from_floats([-1000.0f32, 1000.0], &device);

    let y = FieldActivation::Softplus
        .apply(x)
        .into_data()
        .to_vec::<f32>()
        .unwrap();
    assert!(y.iter().all(|v| v.is_finite()));
    assert!(y[0] >= 0.0 && y[0] < 1e-6);
    assert!((y[1] - 1000.0).abs() < 1e-3);
}

#[test]
fn test_activation_preserves_shape() {
    let device = Default::default();
    let x = Tensor::<Backend, 3>::random(
        [3, 4, 5],
        burn::tensor::Distribution::Uniform(-2.0, 2.0),
        &device,
    );

    for act in [FieldActivation::Tanh, FieldActivation::LeCun, FieldActivation::Softplus] {
        assert_eq!(act.apply(x.clone()).dims(), [3, 4, 5]);
    }
    assert_eq!(FieldActivation::default(), FieldActivation::Tanh);
}
