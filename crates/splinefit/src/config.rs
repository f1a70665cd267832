//! Fitting configuration.
//!
//! Each model has a serde-friendly configuration struct with defaults and
//! `with_*` builders. [`Validate`] checks the settings that do not depend
//! on the data; the data-dependent checks run when fitting.

use serde::{Deserialize, Serialize};

use crate::error::{Validate, ValidationError};
use crate::extrapolation::Extrapolation;

/// Highest supported spline degree.
pub const MAX_DEGREE: usize = 5;

/// Default spline degree.
pub const DEFAULT_DEGREE: usize = 3;

/// Default rank threshold for scattered surface fits.
pub const DEFAULT_EPS: f64 = 1e-16;

fn default_degree() -> usize {
    DEFAULT_DEGREE
}

fn default_eps() -> f64 {
    DEFAULT_EPS
}

// =============================================================================
// CURVES
// =============================================================================

/// Settings for fitting a [`Spline1D`](crate::Spline1D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Spline degree, 1 to 5.
    #[serde(default = "default_degree")]
    pub degree: usize,

    /// Smoothing factor `s`; 0 interpolates.
    #[serde(default)]
    pub smoothing: f64,

    /// Policy for points outside the domain.
    #[serde(default)]
    pub boundary: Extrapolation,

    /// Fit a periodic spline.
    #[serde(default)]
    pub periodic: bool,

    /// Positive weight per sample; uniform when absent.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,

    /// Interior knots for a fixed-knot least-squares fit.
    #[serde(default)]
    pub knots: Option<Vec<f64>>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            smoothing: 0.0,
            boundary: Extrapolation::default(),
            periodic: false,
            weights: None,
            knots: None,
        }
    }
}

impl CurveConfig {
    /// Cubic interpolation with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the degree.
    #[must_use]
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    /// Sets the smoothing factor.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the boundary policy.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Extrapolation) -> Self {
        self.boundary = boundary;
        self
    }

    /// Requests a periodic fit.
    #[must_use]
    pub fn with_periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    /// Sets per-sample weights.
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Fixes the interior knots.
    #[must_use]
    pub fn with_knots(mut self, knots: Vec<f64>) -> Self {
        self.knots = Some(knots);
        self
    }
}

impl Validate for CurveConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_degree("degree", self.degree, &mut errors);
        check_smoothing(self.smoothing, &mut errors);
        if let Some(weights) = &self.weights {
            check_weights(weights, &mut errors);
        }
        if let Some(knots) = &self.knots {
            check_knot_order("knots", knots, &mut errors);
        }
        errors
    }
}

/// Settings for fitting a [`ParametricSpline`](crate::ParametricSpline).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametricConfig {
    /// Settings shared with 1-D curves. Periodic means a closed curve.
    #[serde(flatten)]
    pub curve: CurveConfig,

    /// Parameter value per point; normalized chord length when absent.
    #[serde(default)]
    pub parameters: Option<Vec<f64>>,
}

impl ParametricConfig {
    /// Cubic interpolation with chord-length parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the degree.
    #[must_use]
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.curve.degree = degree;
        self
    }

    /// Sets the smoothing factor.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.curve.smoothing = smoothing;
        self
    }

    /// Sets the boundary policy.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Extrapolation) -> Self {
        self.curve.boundary = boundary;
        self
    }

    /// Requests a closed curve.
    #[must_use]
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.curve.periodic = closed;
        self
    }

    /// Sets per-point weights.
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.curve.weights = Some(weights);
        self
    }

    /// Fixes the interior knots, in parameter space.
    #[must_use]
    pub fn with_knots(mut self, knots: Vec<f64>) -> Self {
        self.curve.knots = Some(knots);
        self
    }

    /// Sets the parameter values.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<f64>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

impl Validate for ParametricConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = self.curve.validate();
        if let Some(u) = &self.parameters {
            check_knot_order("parameters", u, &mut errors);
        }
        errors
    }
}

// =============================================================================
// SURFACES
// =============================================================================

/// Rectangular domain `[xb, xe] x [yb, ye]` of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower x bound.
    pub xb: f64,
    /// Upper x bound.
    pub xe: f64,
    /// Lower y bound.
    pub yb: f64,
    /// Upper y bound.
    pub ye: f64,
}

impl Bounds {
    /// Creates a rectangle.
    pub fn new(xb: f64, xe: f64, yb: f64, ye: f64) -> Self {
        Self { xb, xe, yb, ye }
    }

    /// Smallest rectangle holding every point.
    pub(crate) fn enclosing(x: &[f64], y: &[f64]) -> Self {
        let (xb, xe) = min_max(x);
        let (yb, ye) = min_max(y);
        Self { xb, xe, yb, ye }
    }

    /// Returns true if `(x, y)` lies in the closed rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.xb..=self.xe).contains(&x) && (self.yb..=self.ye).contains(&y)
    }

    fn check(&self, errors: &mut Vec<ValidationError>) {
        let finite = [self.xb, self.xe, self.yb, self.ye].iter().all(|v| v.is_finite());
        if !finite || self.xb >= self.xe || self.yb >= self.ye {
            errors.push(ValidationError::new(
                "bounds",
                "Bounds must be finite with xb < xe and yb < ye",
            ));
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Settings for fitting a [`Spline2D`](crate::Spline2D) to scattered data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Degree along x.
    #[serde(default = "default_degree")]
    pub kx: usize,

    /// Degree along y.
    #[serde(default = "default_degree")]
    pub ky: usize,

    /// Smoothing factor `s`.
    #[serde(default)]
    pub smoothing: f64,

    /// Positive weight per point; uniform when absent.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,

    /// Relative rank threshold of the least-squares solve, in (0, 1).
    #[serde(default = "default_eps")]
    pub eps: f64,

    /// Interior x knots for a fixed-knot fit; needs `knots_y` too.
    #[serde(default)]
    pub knots_x: Option<Vec<f64>>,

    /// Interior y knots for a fixed-knot fit; needs `knots_x` too.
    #[serde(default)]
    pub knots_y: Option<Vec<f64>>,

    /// Domain; the bounding box of the data when absent.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            kx: DEFAULT_DEGREE,
            ky: DEFAULT_DEGREE,
            smoothing: 0.0,
            weights: None,
            eps: DEFAULT_EPS,
            knots_x: None,
            knots_y: None,
            bounds: None,
        }
    }
}

impl SurfaceConfig {
    /// Bicubic settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both degrees.
    #[must_use]
    pub fn with_degrees(mut self, kx: usize, ky: usize) -> Self {
        self.kx = kx;
        self.ky = ky;
        self
    }

    /// Sets the smoothing factor.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets per-point weights.
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Sets the rank threshold.
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Fixes the interior knots on both axes.
    #[must_use]
    pub fn with_knots(mut self, knots_x: Vec<f64>, knots_y: Vec<f64>) -> Self {
        self.knots_x = Some(knots_x);
        self.knots_y = Some(knots_y);
        self
    }

    /// Sets the domain.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl Validate for SurfaceConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_degree("kx", self.kx, &mut errors);
        check_degree("ky", self.ky, &mut errors);
        check_smoothing(self.smoothing, &mut errors);
        if let Some(weights) = &self.weights {
            check_weights(weights, &mut errors);
        }
        if !(self.eps > 0.0 && self.eps < 1.0) {
            errors.push(ValidationError::new("eps", "Rank threshold must lie in (0, 1)"));
        }
        match (&self.knots_x, &self.knots_y) {
            (Some(tx), Some(ty)) => {
                check_knot_order("knots_x", tx, &mut errors);
                check_knot_order("knots_y", ty, &mut errors);
            }
            (None, None) => {}
            _ => errors.push(ValidationError::new(
                "knots",
                "Fixed knots must be given for both axes",
            )),
        }
        if let Some(bounds) = &self.bounds {
            bounds.check(&mut errors);
        }
        errors
    }
}

/// Settings for fitting a [`Spline2D`](crate::Spline2D) to gridded data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Degree along x.
    #[serde(default = "default_degree")]
    pub kx: usize,

    /// Degree along y.
    #[serde(default = "default_degree")]
    pub ky: usize,

    /// Smoothing factor `s`.
    #[serde(default)]
    pub smoothing: f64,

    /// Domain; the grid extent when absent.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            kx: DEFAULT_DEGREE,
            ky: DEFAULT_DEGREE,
            smoothing: 0.0,
            bounds: None,
        }
    }
}

impl GridConfig {
    /// Bicubic interpolation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both degrees.
    #[must_use]
    pub fn with_degrees(mut self, kx: usize, ky: usize) -> Self {
        self.kx = kx;
        self.ky = ky;
        self
    }

    /// Sets the smoothing factor.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the domain.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl Validate for GridConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_degree("kx", self.kx, &mut errors);
        check_degree("ky", self.ky, &mut errors);
        check_smoothing(self.smoothing, &mut errors);
        if let Some(bounds) = &self.bounds {
            bounds.check(&mut errors);
        }
        errors
    }
}

// =============================================================================
// SHARED CHECKS
// =============================================================================

fn check_degree(field: &str, degree: usize, errors: &mut Vec<ValidationError>) {
    if !(1..=MAX_DEGREE).contains(&degree) {
        errors.push(ValidationError::new(
            field,
            format!("Degree must be between 1 and {MAX_DEGREE}, got {degree}"),
        ));
    }
}

fn check_smoothing(smoothing: f64, errors: &mut Vec<ValidationError>) {
    if !(smoothing.is_finite() && smoothing >= 0.0) {
        errors.push(ValidationError::new(
            "smoothing",
            "Smoothing factor must be finite and non-negative",
        ));
    }
}

fn check_weights(weights: &[f64], errors: &mut Vec<ValidationError>) {
    if let Some(i) = weights.iter().position(|&w| !(w.is_finite() && w > 0.0)) {
        errors.push(ValidationError::new(
            "weights",
            format!("Weights must be strictly positive, got {} at index {i}", weights[i]),
        ));
    }
}

fn check_knot_order(field: &str, values: &[f64], errors: &mut Vec<ValidationError>) {
    if values.iter().any(|v| !v.is_finite()) {
        errors.push(ValidationError::new(field, "Values must be finite"));
    } else if let Some(i) = values.windows(2).position(|p| p[1] <= p[0]) {
        errors.push(ValidationError::new(
            field,
            format!("Values must be strictly increasing, violated at index {}", i + 1),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_defaults() {
        let config = CurveConfig::default();
        assert_eq!(config.degree, 3);
        assert_eq!(config.smoothing, 0.0);
        assert_eq!(config.boundary, Extrapolation::Extrapolate);
        assert!(!config.periodic);
        assert!(config.is_valid());
    }

    #[test]
    fn test_curve_validation_collects_every_failure() {
        let config = CurveConfig::new()
            .with_degree(6)
            .with_smoothing(-1.0)
            .with_weights(vec![1.0, 0.0])
            .with_knots(vec![2.0, 1.0]);
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, ["degree", "smoothing", "weights", "knots"]);
    }

    #[test]
    fn test_serde_fills_defaults() {
        let config: CurveConfig = serde_json::from_str(r#"{"smoothing": 0.5, "boundary": "nearest"}"#).unwrap();
        assert_eq!(config.degree, 3);
        assert_eq!(config.boundary, Extrapolation::Nearest);

        let config: ParametricConfig = serde_json::from_str(r#"{"degree": 2, "periodic": true}"#).unwrap();
        assert_eq!(config.curve.degree, 2);
        assert!(config.curve.periodic);
        assert!(config.parameters.is_none());

        let config: SurfaceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SurfaceConfig::default());
    }

    #[test]
    fn test_surface_validation() {
        assert!(SurfaceConfig::new().is_valid());
        assert!(!SurfaceConfig::new().with_eps(1.0).is_valid());
        assert!(!SurfaceConfig::new().with_degrees(0, 3).is_valid());
        assert!(!SurfaceConfig::new().with_bounds(Bounds::new(1.0, 0.0, 0.0, 1.0)).is_valid());

        let mut half = SurfaceConfig::new();
        half.knots_x = Some(vec![0.5]);
        let errors = half.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "knots");
    }

    #[test]
    fn test_grid_validation() {
        assert!(GridConfig::new().with_degrees(1, 5).is_valid());
        assert!(!GridConfig::new().with_smoothing(f64::NAN).is_valid());
    }

    #[test]
    fn test_bounds() {
        let b = Bounds::enclosing(&[0.5, -1.0, 2.0], &[3.0, 4.0, 3.5]);
        assert_eq!(b, Bounds::new(-1.0, 2.0, 3.0, 4.0));
        assert!(b.contains(0.0, 3.5));
        assert!(!b.contains(0.0, 5.0));
    }
}
