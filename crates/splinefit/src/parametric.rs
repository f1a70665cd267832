//! Parametric spline curves `u -> (x_1(u), ..., x_d(u))`.

use std::borrow::Cow;
use std::cell::RefCell;

use log::debug;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use splinefit_fitpack::{clocur, parcur, MAX_IDIM};

use crate::config::ParametricConfig;
use crate::curve::{check_parts, derivative_row, domain, evaluate_row, integrate_row};
use crate::error::{SplineError, SplineResult, Validate};
use crate::extrapolation::Extrapolation;
use crate::outcome::Outcome;
use crate::scratch::Scratch;
use crate::sizing;
use crate::status::{self, Routine};
use crate::validation;

/// A spline curve in 1 to 10 dimensions over one shared knot vector.
///
/// Row `d` of the coefficient table holds the B-spline coefficients of
/// coordinate `d`. Like [`Spline1D`](crate::Spline1D), the curve keeps a
/// scratch buffer for derivatives and integrals and is not `Sync`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "ParametricParts", into = "ParametricParts")]
pub struct ParametricSpline {
    knots: Vec<f64>,
    coefficients: Array2<f64>,
    degree: usize,
    boundary: Extrapolation,
    residual: f64,
    scratch: RefCell<Scratch>,
}

#[derive(Serialize, Deserialize)]
struct ParametricParts {
    knots: Vec<f64>,
    coefficients: Array2<f64>,
    degree: usize,
    boundary: Extrapolation,
    residual: f64,
}

impl TryFrom<ParametricParts> for ParametricSpline {
    type Error = SplineError;

    fn try_from(parts: ParametricParts) -> SplineResult<Self> {
        ParametricSpline::from_parts(parts.knots, parts.coefficients, parts.degree, parts.boundary, parts.residual)
    }
}

impl From<ParametricSpline> for ParametricParts {
    fn from(spline: ParametricSpline) -> Self {
        Self {
            knots: spline.knots,
            coefficients: spline.coefficients,
            degree: spline.degree,
            boundary: spline.boundary,
            residual: spline.residual,
        }
    }
}

impl Clone for ParametricSpline {
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

impl PartialEq for ParametricSpline {
    fn eq(&self, other: &Self) -> bool {
        self.knots == other.knots
            && self.coefficients == other.coefficients
            && self.degree == other.degree
            && self.boundary == other.boundary
            && self.residual == other.residual
    }
}

impl ParametricSpline {
    /// Fits a curve through `points`, one row per dimension and one column
    /// per point.
    ///
    /// Parameters default to the normalized cumulative chord length. A
    /// closed curve needs its last point equal to its first.
    ///
    /// # Errors
    ///
    /// As for [`Spline1D::fit`](crate::Spline1D::fit).
    pub fn fit(points: &Array2<f64>, config: &ParametricConfig) -> SplineResult<Outcome<Self>> {
        config.validate_or_error()?;
        let curve = &config.curve;
        let k = curve.degree;
        let (idim, m) = points.dim();
        if !(1..=MAX_IDIM).contains(&idim) {
            return Err(SplineError::validation(
                "points",
                format!("dimension must be between 1 and {MAX_IDIM}, got {idim}"),
            ));
        }
        validation::sample_count(m, k)?;
        let rows: Vec<Vec<f64>> = points.rows().into_iter().map(|row| row.to_vec()).collect();
        for row in &rows {
            validation::finite("points", row)?;
        }
        if curve.periodic {
            let first: Vec<f64> = rows.iter().map(|r| r[0]).collect();
            let last: Vec<f64> = rows.iter().map(|r| r[m - 1]).collect();
            validation::periodic_ends("points", &first, &last)?;
        }
        let u = match &config.parameters {
            Some(u) => {
                validation::lengths("parameters", m, u.len())?;
                validation::strictly_increasing("parameters", u)?;
                u.clone()
            }
            None => {
                let columns: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
                validation::chord_parameters(&columns, m)?
            }
        };
        let w = validation::weights(curve.weights.as_deref(), m)?;
        let fixed = curve
            .knots
            .as_deref()
            .map(|interior| validation::explicit_knots(&u, interior, k, curve.periodic))
            .transpose()?;

        let (iopt, nest) = match &fixed {
            Some(t) => (-1, t.len()),
            None if curve.periodic => (0, sizing::nest_periodic(m, k)),
            None => (0, sizing::nest_curve(m, k)),
        };
        let mut t = vec![0.0; nest];
        let mut n = 0;
        if let Some(fixed) = &fixed {
            t.copy_from_slice(fixed);
            n = fixed.len();
        }
        // Point-major: coordinate d of point i at i*idim + d.
        let mut x = vec![0.0; m * idim];
        for ((d, i), v) in points.indexed_iter() {
            x[i * idim + d] = *v;
        }
        let mut c = vec![0.0; nest * idim];
        let mut fp = 0.0;
        let mut iwrk = vec![0; sizing::kwrk_curve(nest)];
        let s = curve.smoothing;

        let (routine, code) = if curve.periodic {
            let mut wrk = vec![0.0; sizing::lwrk_clocur(m, k, nest, idim)];
            debug!("clocur: m = {m}, idim = {idim}, k = {k}, s = {s}, nest = {nest}, lwrk = {}", wrk.len());
            let code = clocur(
                iopt, idim, &u, &x, &w, k, s, nest, &mut n, &mut t, &mut c, &mut fp, &mut wrk, &mut iwrk,
            );
            (Routine::Clocur, code)
        } else {
            let mut wrk = vec![0.0; sizing::lwrk_parcur(m, k, nest, idim)];
            debug!("parcur: m = {m}, idim = {idim}, k = {k}, s = {s}, nest = {nest}, lwrk = {}", wrk.len());
            let code = parcur(
                iopt, idim, &u, &x, &w, u[0], u[m - 1], k, s, nest, &mut n, &mut t, &mut c, &mut fp, &mut wrk,
                &mut iwrk,
            );
            (Routine::Parcur, code)
        };
        debug!("{routine}: status {code}, n = {n}, fp = {fp:.6e}");

        let warning = status::translate(routine, code, idim * n.saturating_sub(k + 1))?;
        t.truncate(n);
        let ncoef = n - k - 1;
        let coefficients = Array2::from_shape_fn((idim, ncoef), |(d, j)| c[d * n + j]);
        let spline = Self::assemble(t, coefficients, k, curve.boundary, fp);
        Ok(Outcome::with_warning(spline, warning))
    }

    /// Rebuilds a curve from its knot vector and coefficient table.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the parts are inconsistent.
    pub fn from_parts(
        knots: Vec<f64>,
        coefficients: Array2<f64>,
        degree: usize,
        boundary: Extrapolation,
        residual: f64,
    ) -> SplineResult<Self> {
        let (idim, ncoef) = coefficients.dim();
        if !(1..=MAX_IDIM).contains(&idim) {
            return Err(SplineError::validation(
                "coefficients",
                format!("dimension must be between 1 and {MAX_IDIM}, got {idim}"),
            ));
        }
        check_parts(&knots, ncoef, degree)?;
        if coefficients.iter().any(|v| !v.is_finite()) {
            return Err(SplineError::validation("coefficients", "non-finite coefficient"));
        }
        let coefficients = coefficients.as_standard_layout().into_owned();
        Ok(Self::assemble(knots, coefficients, degree, boundary, residual))
    }

    fn assemble(
        knots: Vec<f64>,
        coefficients: Array2<f64>,
        degree: usize,
        boundary: Extrapolation,
        residual: f64,
    ) -> Self {
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

    fn row(&self, d: usize) -> Cow<'_, [f64]> {
        let view = self.coefficients.row(d);
        match view.to_slice() {
            Some(slice) => Cow::Borrowed(slice),
            None => Cow::Owned(view.to_vec()),
        }
    }

    /// Point on the curve at parameter `u`, one value per dimension.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::OutOfDomain`] under [`Extrapolation::Error`].
    pub fn evaluate_point(&self, u: f64) -> SplineResult<Vec<f64>> {
        let table = self.evaluate(&[u])?;
        Ok(table.row(0).to_vec())
    }

    /// Shorthand for [`ParametricSpline::evaluate_point`].
    ///
    /// # Errors
    ///
    /// As for [`ParametricSpline::evaluate_point`].
    pub fn at(&self, u: f64) -> SplineResult<Vec<f64>> {
        self.evaluate_point(u)
    }

    /// Points at every parameter of `us`, shape `(us.len(), dimension)`.
    ///
    /// # Errors
    ///
    /// As for [`ParametricSpline::evaluate_point`].
    pub fn evaluate(&self, us: &[f64]) -> SplineResult<Array2<f64>> {
        let mut out = Array2::zeros((us.len(), self.dimension()));
        let mut values = vec![0.0; us.len()];
        for d in 0..self.dimension() {
            evaluate_row(&self.knots, &self.row(d), self.degree, self.boundary, us, &mut values)?;
            out.column_mut(d).assign(&ArrayView1::from(values.as_slice()));
        }
        Ok(out)
    }

    /// Derivative of order `order` at every parameter of `us`, shape
    /// `(us.len(), dimension)`.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::DerivativeOrder`] unless `1 <= order <= degree`.
    pub fn derivative(&self, us: &[f64], order: usize) -> SplineResult<Array2<f64>> {
        match self.scratch.try_borrow_mut() {
            Ok(mut scratch) => self.derivative_with(us, order, &mut scratch),
            Err(_) => self.derivative_with(us, order, &mut Scratch::new()),
        }
    }

    /// [`ParametricSpline::derivative`] with caller-owned scratch storage.
    ///
    /// # Errors
    ///
    /// As for [`ParametricSpline::derivative`].
    pub fn derivative_with(&self, us: &[f64], order: usize, scratch: &mut Scratch) -> SplineResult<Array2<f64>> {
        let mut out = Array2::zeros((us.len(), self.dimension()));
        let mut values = vec![0.0; us.len()];
        for d in 0..self.dimension() {
            derivative_row(
                &self.knots,
                &self.row(d),
                self.degree,
                order,
                self.boundary,
                us,
                &mut values,
                scratch,
            )?;
            out.column_mut(d).assign(&ArrayView1::from(values.as_slice()));
        }
        Ok(out)
    }

    /// Integral of each coordinate over `[a, b]`.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::Evaluation`] if the quadrature rejects the
    /// spline.
    pub fn integrate(&self, a: f64, b: f64) -> SplineResult<Vec<f64>> {
        match self.scratch.try_borrow_mut() {
            Ok(mut scratch) => self.integrate_with(a, b, &mut scratch),
            Err(_) => self.integrate_with(a, b, &mut Scratch::new()),
        }
    }

    /// [`ParametricSpline::integrate`] with caller-owned scratch storage.
    ///
    /// # Errors
    ///
    /// As for [`ParametricSpline::integrate`].
    pub fn integrate_with(&self, a: f64, b: f64, scratch: &mut Scratch) -> SplineResult<Vec<f64>> {
        (0..self.dimension())
            .map(|d| integrate_row(&self.knots, &self.row(d), self.degree, a, b, scratch))
            .collect()
    }

    /// Interior knots.
    pub fn knots(&self) -> &[f64] {
        let n = self.knots.len();
        &self.knots[self.degree + 1..n - self.degree - 1]
    }

    /// Full knot vector.
    pub fn all_knots(&self) -> &[f64] {
        &self.knots
    }

    /// Coefficient table, one row per dimension.
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Weighted sum of squared distances of the fit.
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

    /// Parameter domain.
    pub fn domain(&self) -> (f64, f64) {
        domain(&self.knots, self.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::f64::consts::TAU;

    fn circle(m: usize) -> Array2<f64> {
        Array2::from_shape_fn((2, m), |(d, i)| {
            // The last point repeats the first exactly.
            let a = TAU * (i % (m - 1)) as f64 / (m - 1) as f64;
            if d == 0 { a.cos() } else { a.sin() }
        })
    }

    #[test]
    fn test_open_curve_passes_through_points() {
        let points = array![[0.0, 1.0, 2.0, 3.0, 4.0], [0.0, 1.0, 0.0, -1.0, 0.0]];
        let config = ParametricConfig::new().with_parameters(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let spline = ParametricSpline::fit(&points, &config).unwrap().into_value();
        assert_eq!(spline.dimension(), 2);
        assert_eq!(spline.coefficients().ncols(), spline.all_knots().len() - 4);
        let p = spline.at(3.0).unwrap();
        assert_relative_eq!(p[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], -1.0, epsilon = 1e-9);
        // x(u) = u is reproduced exactly.
        let d = spline.derivative(&[1.5], 1).unwrap();
        assert_relative_eq!(d[[0, 0]], 1.0, epsilon = 1e-9);
        let area = spline.integrate(0.0, 4.0).unwrap();
        assert_relative_eq!(area[0], 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_curve_meets_itself() {
        let points = circle(17);
        let config = ParametricConfig::new().with_closed(true);
        let spline = ParametricSpline::fit(&points, &config).unwrap().into_value();
        let (a, b) = spline.domain();
        assert_relative_eq!(a, 0.0);
        assert_relative_eq!(b, 1.0, epsilon = 1e-12);
        let ends = spline.evaluate(&[a, b]).unwrap();
        assert_relative_eq!(ends[[0, 0]], ends[[1, 0]], epsilon = 1e-9);
        assert_relative_eq!(ends[[0, 1]], ends[[1, 1]], epsilon = 1e-9);
        let mid = spline.at(0.5).unwrap();
        assert_relative_eq!(mid[0], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_curve_requires_matching_ends() {
        let points = array![[0.0, 1.0, 1.0, 0.0, 0.5], [0.0, 0.0, 1.0, 1.0, 0.5]];
        let config = ParametricConfig::new().with_closed(true).with_degree(1);
        assert!(ParametricSpline::fit(&points, &config).unwrap_err().is_validation());
    }

    #[test]
    fn test_rejects_repeated_points_without_parameters() {
        let points = array![[0.0, 1.0, 1.0, 2.0, 3.0], [0.0, 1.0, 1.0, 2.0, 3.0]];
        assert!(ParametricSpline::fit(&points, &ParametricConfig::new()).is_err());
    }
}
