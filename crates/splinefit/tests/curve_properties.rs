//! Integration tests: fitting and using 1-D and parametric curves.

use approx::assert_relative_eq;
use ndarray::Array2;
use proptest::prelude::*;
use splinefit::prelude::*;
use std::f64::consts::PI;

fn samples(f: impl Fn(f64) -> f64, a: f64, b: f64, m: usize) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..m).map(|i| a + (b - a) * i as f64 / (m - 1) as f64).collect();
    let y = x.iter().map(|&v| f(v)).collect();
    (x, y)
}

#[test]
fn test_zigzag_example() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [0.0, 1.0, 0.0, 1.0, 0.0];
    let outcome = Spline1D::fit(&x, &y, &CurveConfig::default()).unwrap();
    assert!(outcome.is_clean());
    let spline = outcome.into_value();
    assert_relative_eq!(spline.evaluate_point(2.0).unwrap(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(spline.residual(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_coefficient_count_matches_knots() {
    let (x, y) = samples(|v| (3.0 * v).sin() + 0.1 * v, 0.0, 4.0, 40);
    for degree in 1..=5 {
        for smoothing in [0.0, 0.05, 5.0] {
            let config = CurveConfig::new().with_degree(degree).with_smoothing(smoothing);
            let spline = Spline1D::fit(&x, &y, &config).unwrap().into_value();
            assert_eq!(spline.coefficients().len(), spline.all_knots().len() - degree - 1);
            assert_eq!(spline.knots().len() + 2 * degree + 2, spline.all_knots().len());
        }
    }
}

#[test]
fn test_smoothing_uses_fewer_knots() {
    let (x, y) = samples(|v| v.sin() + 0.02 * (37.0 * v).sin(), 0.0, 6.0, 60);
    let exact = Spline1D::fit(&x, &y, &CurveConfig::default()).unwrap().into_value();
    let smooth = Spline1D::fit(&x, &y, &CurveConfig::new().with_smoothing(0.05)).unwrap();
    let smooth = smooth.into_value();
    assert!(smooth.all_knots().len() < exact.all_knots().len());
    assert!(smooth.residual() < 0.1);
}

#[test]
fn test_derivative_order_range_for_every_degree() {
    let (x, y) = samples(|v| v * v, 0.0, 3.0, 12);
    for degree in 1..=5 {
        let spline = Spline1D::interpolate(&x, &y, degree).unwrap();
        assert!(matches!(
            spline.derivative(&[1.0], 0),
            Err(SplineError::DerivativeOrder { order: 0, .. })
        ));
        assert!(matches!(
            spline.derivative(&[1.0], degree + 1),
            Err(SplineError::DerivativeOrder { .. })
        ));
        for order in 1..=degree {
            assert!(spline.derivative(&[0.5, 1.0, 2.5], order).is_ok());
        }
    }
}

#[test]
fn test_periodic_curve_closes() {
    let (x, mut y) = samples(|v| (2.0 * PI * v).sin() + 0.3 * (4.0 * PI * v).cos(), 0.0, 1.0, 25);
    let last = y.len() - 1;
    y[last] = y[0];
    for smoothing in [0.0, 0.01] {
        let config = CurveConfig::new().with_periodic(true).with_smoothing(smoothing);
        let spline = Spline1D::fit(&x, &y, &config).unwrap().into_value();
        assert_relative_eq!(spline.at(0.0).unwrap(), spline.at(1.0).unwrap(), epsilon = 1e-9);
        let slopes = spline.derivative(&[0.0, 1.0], 1).unwrap();
        assert_relative_eq!(slopes[0], slopes[1], epsilon = 1e-7);
    }
}

#[test]
fn test_roots_of_sine() {
    let (x, y) = samples(f64::sin, 0.5, 9.0, 80);
    let spline = Spline1D::interpolate(&x, &y, 3).unwrap();

    let roots = spline.roots(5).unwrap();
    assert!(roots.is_clean());
    let roots = roots.into_value();
    assert_eq!(roots.len(), 2);
    assert!(roots.windows(2).all(|p| p[0] < p[1]));
    assert_relative_eq!(roots[0], PI, epsilon = 1e-4);
    assert_relative_eq!(roots[1], 2.0 * PI, epsilon = 1e-4);

    let truncated = spline.roots(1).unwrap();
    assert_eq!(
        truncated.warning().map(|w| w.kind),
        Some(WarningKind::RootsTruncated { limit: 1 })
    );
    assert_eq!(truncated.value().len(), 1);
    assert_relative_eq!(truncated.value()[0], PI, epsilon = 1e-4);

    let quadratic = Spline1D::interpolate(&x, &y, 2).unwrap();
    assert_eq!(
        quadratic.roots(5).map(|_| ()),
        Err(SplineError::RootsRequireCubic { degree: 2 })
    );
}

#[test]
fn test_roots_at_the_boundary_and_touching_zeros() {
    let (x, y) = samples(f64::sin, 0.0, 7.0, 60);
    let spline = Spline1D::interpolate(&x, &y, 3).unwrap();
    let roots = spline.roots(5).unwrap().into_value();
    assert_eq!(roots.len(), 3);
    assert!(roots[0].abs() < 1e-9);
    assert_relative_eq!(roots[1], PI, epsilon = 1e-4);
    assert_relative_eq!(roots[2], 2.0 * PI, epsilon = 1e-4);

    let (x, y) = samples(|v| (v - 2.0) * (v - 2.0), 0.0, 4.0, 9);
    let parabola = Spline1D::interpolate(&x, &y, 3).unwrap();
    let roots = parabola.roots(5).unwrap().into_value();
    assert_eq!(roots.len(), 1);
    assert_relative_eq!(roots[0], 2.0, epsilon = 1e-6);
}

#[test]
fn test_invalid_samples_are_rejected_before_fitting() {
    let x = [0.0, 1.0, 2.0, 1.5, 4.0];
    let y = [0.0; 5];
    let err = Spline1D::fit(&x, &y, &CurveConfig::default()).unwrap_err();
    assert!(matches!(err, SplineError::Validation { ref field, .. } if field == "x"));

    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let config = CurveConfig::new().with_weights(vec![1.0, 1.0, -2.0, 1.0, 1.0]);
    let err = Spline1D::fit(&x, &y, &config).unwrap_err();
    assert!(matches!(err, SplineError::Validation { ref field, .. } if field == "weights"));

    let config = CurveConfig::new().with_knots(vec![0.0, 2.0]);
    assert!(Spline1D::fit(&x, &y, &config).unwrap_err().is_validation());
}

#[test]
fn test_nearest_clamps_and_error_rejects() {
    let (x, y) = samples(|v| v * v * v, -1.0, 1.0, 9);
    let spline = Spline1D::interpolate(&x, &y, 3).unwrap();
    let nearest = spline.clone().with_boundary(Extrapolation::Nearest);
    assert_relative_eq!(nearest.at(3.0).unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(spline.at(2.0).unwrap(), 8.0, epsilon = 1e-9);
    let strict = spline.with_boundary(Extrapolation::Error);
    assert!(matches!(strict.at(-1.5), Err(SplineError::OutOfDomain { .. })));
}

#[test]
fn test_parametric_curve_helix() {
    let m = 30;
    let points = Array2::from_shape_fn((3, m), |(d, i)| {
        let a = 4.0 * PI * i as f64 / (m - 1) as f64;
        match d {
            0 => a.cos(),
            1 => a.sin(),
            _ => 0.2 * a,
        }
    });
    let spline = ParametricSpline::fit(&points, &ParametricConfig::new()).unwrap().into_value();
    assert_eq!(spline.dimension(), 3);
    let samples = spline.evaluate(&[0.0, 1.0]).unwrap();
    assert_eq!(samples.dim(), (2, 3));
    assert_relative_eq!(samples[[0, 0]], 1.0, epsilon = 1e-9);
    assert_relative_eq!(samples[[1, 2]], 0.8 * PI, epsilon = 1e-9);
    // The helix climbs at a constant rate in chord-length parameters.
    let slope = spline.derivative(&[0.3, 0.6], 1).unwrap();
    assert_relative_eq!(slope[[0, 2]], slope[[1, 2]], epsilon = 1e-3);
    assert_eq!(spline.integrate(0.0, 1.0).unwrap().len(), 3);
}

#[test]
fn test_serde_round_trip_keeps_equality() {
    let (x, y) = samples(f64::cos, 0.0, 3.0, 15);
    let spline = Spline1D::fit(&x, &y, &CurveConfig::new().with_smoothing(0.001)).unwrap().into_value();
    spline.derivative(&[1.0], 2).unwrap();
    let json = serde_json::to_string(&spline).unwrap();
    let back: Spline1D = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spline);
    assert_eq!(back.at(1.3).unwrap(), spline.at(1.3).unwrap());

    let points = Array2::from_shape_fn((2, 8), |(d, i)| if d == 0 { i as f64 } else { (i as f64).sqrt() });
    let curve = ParametricSpline::fit(&points, &ParametricConfig::new()).unwrap().into_value();
    let json = serde_json::to_string(&curve).unwrap();
    let back: ParametricSpline = serde_json::from_str(&json).unwrap();
    assert_eq!(back, curve);

    let broken = r#"{"knots":[0,0,1,1],"coefficients":[1],"degree":1,"boundary":"zero","residual":0}"#;
    assert!(serde_json::from_str::<Spline1D>(broken).is_err());
}

#[test]
fn test_caller_scratch_matches_internal_scratch() {
    let (x, y) = samples(|v| v.exp(), 0.0, 1.0, 10);
    let spline = Spline1D::interpolate(&x, &y, 4).unwrap();
    let mut scratch = Scratch::new();
    assert_eq!(
        spline.derivative_with(&[0.25], 2, &mut scratch).unwrap(),
        spline.derivative(&[0.25], 2).unwrap()
    );
    assert_eq!(
        spline.integrate_with(0.0, 1.0, &mut scratch).unwrap(),
        spline.integrate(0.0, 1.0).unwrap()
    );
    assert_relative_eq!(spline.integrate(0.0, 1.0).unwrap(), 1.0_f64.exp() - 1.0, epsilon = 1e-6);
}

proptest! {
    #[test]
    fn prop_interpolation_reproduces_samples(
        degree in 1usize..=5,
        values in prop::collection::vec(-50.0f64..50.0, 8..30),
        gaps in prop::collection::vec(0.1f64..2.0, 30),
    ) {
        let m = values.len();
        let mut x = Vec::with_capacity(m);
        let mut acc = 0.0;
        for gap in &gaps[..m] {
            x.push(acc);
            acc += gap;
        }
        let spline = Spline1D::interpolate(&x, &values, degree).unwrap();
        let fitted = spline.evaluate(&x).unwrap();
        for (f, v) in fitted.iter().zip(&values) {
            prop_assert!((f - v).abs() < 1e-6 * (1.0 + v.abs()), "{} vs {}", f, v);
        }
        prop_assert_eq!(spline.coefficients().len(), spline.all_knots().len() - degree - 1);
    }

    #[test]
    fn prop_integral_reverses_sign(a in 0.0f64..2.0, b in 2.0f64..4.0) {
        let (x, y) = samples(|v| 1.0 + v.sin(), 0.0, 4.0, 15);
        let spline = Spline1D::interpolate(&x, &y, 3).unwrap();
        let forward = spline.integrate(a, b).unwrap();
        let backward = spline.integrate(b, a).unwrap();
        prop_assert!((forward + backward).abs() < 1e-12);
        prop_assert!(forward > 0.0);
    }
}
