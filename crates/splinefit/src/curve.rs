//! Smoothing spline curves `y = s(x)`.

use std::cell::RefCell;

use log::debug;
use serde::{Deserialize, Serialize};
use splinefit_fitpack::{curfit, percur, splder, splev, splint, sproot};

use crate::config::{CurveConfig, MAX_DEGREE};
use crate::error::{SplineError, SplineResult, Validate};
use crate::extrapolation::Extrapolation;
use crate::outcome::Outcome;
use crate::scratch::Scratch;
use crate::sizing;
use crate::status::{self, Routine};
use crate::validation;

/// A fitted B-spline curve of degree 1 to 5.
///
/// The knots, coefficients, degree, boundary policy and residual never
/// change after fitting. Derivative and integral calls reuse an internal
/// scratch buffer, which makes the type `Send` but not `Sync`; share a
/// curve across threads by cloning it, or call the `*_with` variants with
/// a [`Scratch`] per thread.
///
/// # Example
///
/// ```rust
/// use splinefit::{CurveConfig, Spline1D};
///
/// let x = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let y = [0.0, 1.0, 0.0, 1.0, 0.0];
/// let spline = Spline1D::fit(&x, &y, &CurveConfig::default()).unwrap().into_value();
/// assert!(spline.at(2.0).unwrap().abs() < 1e-9);
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "CurveParts", into = "CurveParts")]
pub struct Spline1D {
    knots: Vec<f64>,
    coefficients: Vec<f64>,
    degree: usize,
    boundary: Extrapolation,
    residual: f64,
    scratch: RefCell<Scratch>,
}

/// The serialized form of a curve.
#[derive(Serialize, Deserialize)]
struct CurveParts {
    knots: Vec<f64>,
    coefficients: Vec<f64>,
    degree: usize,
    boundary: Extrapolation,
    residual: f64,
}

impl TryFrom<CurveParts> for Spline1D {
    type Error = SplineError;

    fn try_from(parts: CurveParts) -> SplineResult<Self> {
        Spline1D::from_parts(parts.knots, parts.coefficients, parts.degree, parts.boundary, parts.residual)
    }
}

impl From<Spline1D> for CurveParts {
    fn from(spline: Spline1D) -> Self {
        Self {
            knots: spline.knots,
            coefficients: spline.coefficients,
            degree: spline.degree,
            boundary: spline.boundary,
            residual: spline.residual,
        }
    }
}

impl Clone for Spline1D {
    fn clone(&self) -> Self {
        Self::assemble(
            self.knots.clone(),
            self.coefficients.clone(),
            self.degree,
            self.boundary,
            self.residual,
        )
    }
}

impl PartialEq for Spline1D {
    fn eq(&self, other: &Self) -> bool {
        self.knots == other.knots
            && self.coefficients == other.coefficients
            && self.degree == other.degree
            && self.boundary == other.boundary
            && self.residual == other.residual
    }
}

impl Spline1D {
    /// Fits a curve to the samples `(x, y)`.
    ///
    /// With explicit knots in the configuration this is a single weighted
    /// least-squares fit; otherwise knots are placed automatically until
    /// the residual meets the smoothing factor.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::Validation`] for malformed input and
    /// [`SplineError::FitFailed`] when the routine produces no spline.
    /// A degraded fit comes back as a warning in the [`Outcome`].
    pub fn fit(x: &[f64], y: &[f64], config: &CurveConfig) -> SplineResult<Outcome<Self>> {
        config.validate_or_error()?;
        let k = config.degree;
        let m = x.len();
        validation::lengths("y", m, y.len())?;
        validation::sample_count(m, k)?;
        validation::strictly_increasing("x", x)?;
        validation::finite("y", y)?;
        let w = validation::weights(config.weights.as_deref(), m)?;
        if config.periodic {
            validation::periodic_ends("y", &y[..1], &y[m - 1..])?;
        }
        let fixed = config
            .knots
            .as_deref()
            .map(|interior| validation::explicit_knots(x, interior, k, config.periodic))
            .transpose()?;

        let (iopt, nest) = match &fixed {
            Some(t) => (-1, t.len()),
            None if config.periodic => (0, sizing::nest_periodic(m, k)),
            None => (0, sizing::nest_curve(m, k)),
        };
        let mut t = vec![0.0; nest];
        let mut c = vec![0.0; nest];
        let mut n = 0;
        if let Some(fixed) = &fixed {
            t.copy_from_slice(fixed);
            n = fixed.len();
        }
        let mut fp = 0.0;
        let mut iwrk = vec![0; sizing::kwrk_curve(nest)];
        let s = config.smoothing;

        let (routine, code) = if config.periodic {
            let mut wrk = vec![0.0; sizing::lwrk_percur(m, k, nest)];
            debug!("percur: m = {m}, k = {k}, s = {s}, nest = {nest}, lwrk = {}", wrk.len());
            let code = percur(iopt, x, y, &w, k, s, nest, &mut n, &mut t, &mut c, &mut fp, &mut wrk, &mut iwrk);
            (Routine::Percur, code)
        } else {
            let mut wrk = vec![0.0; sizing::lwrk_curfit(m, k, nest)];
            debug!("curfit: m = {m}, k = {k}, s = {s}, nest = {nest}, lwrk = {}", wrk.len());
            let code = curfit(
                iopt, x, y, &w, x[0], x[m - 1], k, s, nest, &mut n, &mut t, &mut c, &mut fp, &mut wrk, &mut iwrk,
            );
            (Routine::Curfit, code)
        };
        debug!("{routine}: status {code}, n = {n}, fp = {fp:.6e}");
        Self::from_routine(routine, code, (t, n), c, k, config.boundary, fp)
    }

    /// Decodes a fitting routine's status and trims its knot and
    /// coefficient buffers to the `n` knots it reported.
    fn from_routine(
        routine: Routine,
        code: i32,
        (mut t, n): (Vec<f64>, usize),
        mut c: Vec<f64>,
        k: usize,
        boundary: Extrapolation,
        fp: f64,
    ) -> SplineResult<Outcome<Self>> {
        let warning = status::translate(routine, code, n.saturating_sub(k + 1))?;
        t.truncate(n);
        c.truncate(n - k - 1);
        Ok(Outcome::with_warning(Self::assemble(t, c, k, boundary, fp), warning))
    }

    /// Interpolating spline of the given degree through `(x, y)`.
    ///
    /// # Errors
    ///
    /// As for [`Spline1D::fit`].
    pub fn interpolate(x: &[f64], y: &[f64], degree: usize) -> SplineResult<Self> {
        let config = CurveConfig::new().with_degree(degree);
        Self::fit(x, y, &config).map(Outcome::into_value)
    }

    /// Rebuilds a curve from its full knot vector and coefficients.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the parts are inconsistent.
    pub fn from_parts(
        knots: Vec<f64>,
        coefficients: Vec<f64>,
        degree: usize,
        boundary: Extrapolation,
        residual: f64,
    ) -> SplineResult<Self> {
        check_parts(&knots, coefficients.len(), degree)?;
        validation::finite("coefficients", &coefficients)?;
        Ok(Self::assemble(knots, coefficients, degree, boundary, residual))
    }

    fn assemble(knots: Vec<f64>, coefficients: Vec<f64>, degree: usize, boundary: Extrapolation, residual: f64) -> Self {
        let len = sizing::scratch_curve(knots.len());
        Self {
            knots,
            coefficients,
            degree,
            boundary,
            residual,
            scratch: RefCell::new(Scratch::with_capacity(len)),
        }
    }

    /// Same curve with another boundary policy.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Extrapolation) -> Self {
        self.boundary = boundary;
        self
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Value at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::OutOfDomain`] under [`Extrapolation::Error`].
    pub fn evaluate_point(&self, x: f64) -> SplineResult<f64> {
        let mut out = [0.0];
        evaluate_row(&self.knots, &self.coefficients, self.degree, self.boundary, &[x], &mut out)?;
        Ok(out[0])
    }

    /// Shorthand for [`Spline1D::evaluate_point`].
    ///
    /// # Errors
    ///
    /// As for [`Spline1D::evaluate_point`].
    pub fn at(&self, x: f64) -> SplineResult<f64> {
        self.evaluate_point(x)
    }

    /// Values at every point of `xs`.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::OutOfDomain`] for the first point outside the
    /// domain under [`Extrapolation::Error`].
    pub fn evaluate(&self, xs: &[f64]) -> SplineResult<Vec<f64>> {
        let mut out = vec![0.0; xs.len()];
        evaluate_row(&self.knots, &self.coefficients, self.degree, self.boundary, xs, &mut out)?;
        Ok(out)
    }

    /// Derivative of order `order` (1 to the degree) at every point of `xs`.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::DerivativeOrder`] for an unsupported order,
    /// and the errors of [`Spline1D::evaluate`].
    pub fn derivative(&self, xs: &[f64], order: usize) -> SplineResult<Vec<f64>> {
        self.with_scratch(|scratch| self.derivative_with(xs, order, scratch))
    }

    /// Derivative of order `order` at `x`.
    ///
    /// # Errors
    ///
    /// As for [`Spline1D::derivative`].
    pub fn derivative_at(&self, x: f64, order: usize) -> SplineResult<f64> {
        let values = self.derivative(&[x], order)?;
        Ok(values[0])
    }

    /// [`Spline1D::derivative`] with caller-owned scratch storage.
    ///
    /// # Errors
    ///
    /// As for [`Spline1D::derivative`].
    pub fn derivative_with(&self, xs: &[f64], order: usize, scratch: &mut Scratch) -> SplineResult<Vec<f64>> {
        let mut out = vec![0.0; xs.len()];
        derivative_row(
            &self.knots,
            &self.coefficients,
            self.degree,
            order,
            self.boundary,
            xs,
            &mut out,
            scratch,
        )?;
        Ok(out)
    }

    /// Definite integral over `[a, b]`.
    ///
    /// Limits are clamped to the domain; reversed limits negate the result.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::Evaluation`] if the quadrature rejects the
    /// spline.
    pub fn integrate(&self, a: f64, b: f64) -> SplineResult<f64> {
        self.with_scratch(|scratch| self.integrate_with(a, b, scratch))
    }

    /// [`Spline1D::integrate`] with caller-owned scratch storage.
    ///
    /// # Errors
    ///
    /// As for [`Spline1D::integrate`].
    pub fn integrate_with(&self, a: f64, b: f64, scratch: &mut Scratch) -> SplineResult<f64> {
        integrate_row(&self.knots, &self.coefficients, self.degree, a, b, scratch)
    }

    /// Zeros of a cubic spline in ascending order, at most `max_count`.
    ///
    /// When more zeros exist the first `max_count` are returned with a
    /// [`WarningKind::RootsTruncated`](crate::WarningKind::RootsTruncated)
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::RootsRequireCubic`] unless the degree is 3.
    pub fn roots(&self, max_count: usize) -> SplineResult<Outcome<Vec<f64>>> {
        if self.degree != 3 {
            return Err(SplineError::RootsRequireCubic { degree: self.degree });
        }
        if max_count == 0 {
            return Err(SplineError::validation("max_count", "must be at least 1"));
        }
        let mut zeros = vec![0.0; max_count];
        let mut count = 0;
        let code = sproot(
            &self.knots,
            self.knots.len(),
            &self.coefficients,
            self.degree,
            &mut zeros,
            &mut count,
        );
        let warning = status::translate(Routine::Sproot, code, max_count)?;
        zeros.truncate(count);
        Ok(Outcome::with_warning(zeros, warning))
    }

    fn with_scratch<R>(&self, f: impl FnOnce(&mut Scratch) -> R) -> R {
        match self.scratch.try_borrow_mut() {
            Ok(mut scratch) => f(&mut scratch),
            Err(_) => f(&mut Scratch::new()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Interior knots.
    pub fn knots(&self) -> &[f64] {
        let n = self.knots.len();
        &self.knots[self.degree + 1..n - self.degree - 1]
    }

    /// Full knot vector, boundary knots included.
    pub fn all_knots(&self) -> &[f64] {
        &self.knots
    }

    /// B-spline coefficients; `knots().len() + degree + 1` of them.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Weighted sum of squared residuals of the fit.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Spline degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Boundary policy.
    pub fn boundary(&self) -> Extrapolation {
        self.boundary
    }

    /// Domain `(t[k], t[n-k-1])`.
    pub fn domain(&self) -> (f64, f64) {
        domain(&self.knots, self.degree)
    }
}

// =============================================================================
// Shared row helpers, also used per dimension by parametric curves
// =============================================================================

pub(crate) fn domain(t: &[f64], k: usize) -> (f64, f64) {
    (t[k], t[t.len() - k - 1])
}

pub(crate) fn check_parts(t: &[f64], ncoef: usize, k: usize) -> SplineResult<()> {
    if !(1..=MAX_DEGREE).contains(&k) {
        return Err(SplineError::validation(
            "degree",
            format!("degree must be between 1 and {MAX_DEGREE}, got {k}"),
        ));
    }
    let n = t.len();
    if n < 2 * k + 2 {
        return Err(SplineError::validation(
            "knots",
            format!("degree {k} needs at least {} knots, got {n}", 2 * k + 2),
        ));
    }
    validation::non_decreasing("knots", t)?;
    if t[k] >= t[n - k - 1] {
        return Err(SplineError::validation("knots", "the spline domain is empty"));
    }
    validation::lengths("coefficients", n - k - 1, ncoef)
}

fn out_of_domain(t: &[f64], k: usize, xs: &[f64]) -> SplineError {
    let (min, max) = domain(t, k);
    let x = xs.iter().copied().find(|x| !(min..=max).contains(x)).unwrap_or(f64::NAN);
    SplineError::out_of_domain(x, min, max)
}

fn evaluation_status(routine: Routine, code: i32, t: &[f64], k: usize, xs: &[f64]) -> SplineResult<()> {
    match code {
        0 => Ok(()),
        1 => Err(out_of_domain(t, k, xs)),
        _ => status::translate(routine, code, 0).map(|_| ()),
    }
}

pub(crate) fn evaluate_row(
    t: &[f64],
    c: &[f64],
    k: usize,
    boundary: Extrapolation,
    xs: &[f64],
    out: &mut [f64],
) -> SplineResult<()> {
    if xs.is_empty() {
        return Ok(());
    }
    let code = splev(t, t.len(), c, k, xs, out, boundary.code());
    evaluation_status(Routine::Splev, code, t, k, xs)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn derivative_row(
    t: &[f64],
    c: &[f64],
    k: usize,
    order: usize,
    boundary: Extrapolation,
    xs: &[f64],
    out: &mut [f64],
    scratch: &mut Scratch,
) -> SplineResult<()> {
    if order == 0 || order > k {
        return Err(SplineError::derivative_order(order, 1, k));
    }
    if xs.is_empty() {
        return Ok(());
    }
    let n = t.len();
    let wrk = scratch.buffer(sizing::scratch_curve(n));
    let code = splder(t, n, c, k, order, xs, out, boundary.code(), wrk);
    evaluation_status(Routine::Splder, code, t, k, xs)
}

pub(crate) fn integrate_row(t: &[f64], c: &[f64], k: usize, a: f64, b: f64, scratch: &mut Scratch) -> SplineResult<f64> {
    let n = t.len();
    let wrk = scratch.buffer(sizing::scratch_curve(n));
    let value = splint(t, n, c, k, a, b, wrk);
    if value.is_nan() && !(a.is_nan() || b.is_nan()) {
        return status::translate(Routine::Splint, 10, 0).map(|_| value);
    }
    Ok(value)
}
