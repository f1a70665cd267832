//! Tensor-product spline surfaces `z = s(x, y)`.
//!
//! The routines treat their first axis as the slow one. Every call below
//! hands them the caller's y axis first and x second, so that coefficient
//! tables and evaluation grids always have x varying fastest.

use log::{debug, trace};
use ndarray::{Array2, ShapeBuilder};
use serde::{Deserialize, Serialize};
use splinefit_fitpack::{bispev, dblint, parder, regrid, surfit};

use crate::config::{Bounds, GridConfig, SurfaceConfig, MAX_DEGREE};
use crate::error::{SplineError, SplineResult, Validate};
use crate::outcome::Outcome;
use crate::sizing;
use crate::status::{self, Routine};
use crate::validation;

/// A fitted bivariate B-spline surface.
///
/// Coefficient `(ix, iy)` is stored at `iy * (nx - kx - 1) + ix`. The
/// surface holds no scratch state and can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceParts", into = "SurfaceParts")]
pub struct Spline2D {
    tx: Vec<f64>,
    ty: Vec<f64>,
    coefficients: Vec<f64>,
    kx: usize,
    ky: usize,
    residual: f64,
}

#[derive(Serialize, Deserialize)]
struct SurfaceParts {
    tx: Vec<f64>,
    ty: Vec<f64>,
    coefficients: Vec<f64>,
    kx: usize,
    ky: usize,
    residual: f64,
}

impl TryFrom<SurfaceParts> for Spline2D {
    type Error = SplineError;

    fn try_from(p: SurfaceParts) -> SplineResult<Self> {
        Spline2D::from_parts(p.tx, p.ty, p.coefficients, p.kx, p.ky, p.residual)
    }
}

impl From<Spline2D> for SurfaceParts {
    fn from(s: Spline2D) -> Self {
        Self {
            tx: s.tx,
            ty: s.ty,
            coefficients: s.coefficients,
            kx: s.kx,
            ky: s.ky,
            residual: s.residual,
        }
    }
}

/// Knot buffers for one axis while fitting.
struct AxisKnots {
    n: usize,
    t: Vec<f64>,
    nest: usize,
}

impl AxisKnots {
    fn automatic(nest: usize) -> Self {
        Self {
            n: 0,
            t: vec![0.0; nest],
            nest,
        }
    }

    /// Full-length knot vector with the interior knots in place.
    fn fixed(interior: &[f64], k: usize, lo: f64, hi: f64, field: &str) -> SplineResult<Self> {
        validation::strictly_increasing(field, interior)?;
        if let Some(&bad) = interior.iter().find(|&&v| v <= lo || v >= hi) {
            return Err(SplineError::validation(
                field,
                format!("interior knot {bad} is not strictly inside ({lo}, {hi})"),
            ));
        }
        let n = sizing::nest_explicit(interior.len(), k);
        let mut t = vec![0.0; n];
        t[k + 1..n - k - 1].copy_from_slice(interior);
        Ok(Self { n, t, nest: n })
    }

    fn into_knots(mut self) -> Vec<f64> {
        self.t.truncate(self.n);
        self.t
    }
}

impl Spline2D {
    /// Fits a surface to scattered points `(x[i], y[i], z[i])`.
    ///
    /// When the rank-deficient branch of the routine needs more secondary
    /// workspace than was provided, the workspace is grown to the reported
    /// size and the fit resumes from its current knots.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::Validation`] for malformed input and
    /// [`SplineError::FitFailed`] when no surface results. Rank deficiency
    /// and unmet tolerances come back as warnings.
    pub fn fit_scattered(x: &[f64], y: &[f64], z: &[f64], config: &SurfaceConfig) -> SplineResult<Outcome<Self>> {
        config.validate_or_error()?;
        let (kx, ky) = (config.kx, config.ky);
        let m = x.len();
        validation::lengths("y", m, y.len())?;
        validation::lengths("z", m, z.len())?;
        validation::finite("x", x)?;
        validation::finite("y", y)?;
        validation::finite("z", z)?;
        if m <= (kx + 1) * (ky + 1) {
            return Err(SplineError::validation(
                "x",
                format!("degrees ({kx}, {ky}) need more than {} points, got {m}", (kx + 1) * (ky + 1)),
            ));
        }
        let w = validation::weights(config.weights.as_deref(), m)?;
        let bounds = config.bounds.unwrap_or_else(|| Bounds::enclosing(x, y));
        if bounds.xb >= bounds.xe || bounds.yb >= bounds.ye {
            return Err(SplineError::validation("x", "the data spans an empty rectangle"));
        }
        if let Some(i) = (0..m).find(|&i| !bounds.contains(x[i], y[i])) {
            return Err(SplineError::validation(
                "bounds",
                format!("point ({}, {}) lies outside the bounds", x[i], y[i]),
            ));
        }

        let (mut ax, mut ay, mut iopt) = match (&config.knots_x, &config.knots_y) {
            (Some(kx_int), Some(ky_int)) => (
                AxisKnots::fixed(kx_int, kx, bounds.xb, bounds.xe, "knots_x")?,
                AxisKnots::fixed(ky_int, ky, bounds.yb, bounds.ye, "knots_y")?,
                -1,
            ),
            _ => (
                AxisKnots::automatic(sizing::nest_scattered(m, kx)),
                AxisKnots::automatic(sizing::nest_scattered(m, ky)),
                0,
            ),
        };

        // Routine order from here on: y first, x second.
        let mut c = vec![0.0; (ay.nest - ky - 1) * (ax.nest - kx - 1)];
        let mut wrk1 = vec![0.0; sizing::lwrk1_surfit(m, ky, kx, ay.nest, ax.nest)];
        let mut wrk2 = vec![0.0; sizing::lwrk2_surfit(2 * ky + 2, 2 * kx + 2, ky, kx)];
        let mut iwrk = vec![0; sizing::kwrk_surfit(m, ky, kx, ay.nest, ax.nest)];
        let mut fp = 0.0;
        debug!(
            "surfit: m = {m}, kx = {kx}, ky = {ky}, s = {}, nxest = {}, nyest = {}, lwrk1 = {}, lwrk2 = {}",
            config.smoothing,
            ax.nest,
            ay.nest,
            wrk1.len(),
            wrk2.len()
        );

        let code = loop {
            let code = surfit(
                iopt,
                y,
                x,
                z,
                &w,
                bounds.yb,
                bounds.ye,
                bounds.xb,
                bounds.xe,
                ky,
                kx,
                config.smoothing,
                ay.nest,
                ax.nest,
                config.eps,
                &mut ay.n,
                &mut ay.t,
                &mut ax.n,
                &mut ax.t,
                &mut c,
                &mut fp,
                &mut wrk1,
                &mut wrk2,
                &mut iwrk,
            );
            if code <= 10 {
                break code;
            }
            let required = code as usize;
            if required <= wrk2.len() {
                break code;
            }
            trace!("surfit: status {code}, growing wrk2 from {} to {required}", wrk2.len());
            wrk2.resize(required, 0.0);
            if iopt == 0 {
                iopt = 1;
            }
        };
        debug!("surfit: status {code}, nx = {}, ny = {}, fp = {fp:.6e}", ax.n, ay.n);

        let ncof = ax.n.saturating_sub(kx + 1) * ay.n.saturating_sub(ky + 1);
        let warning = status::translate(Routine::Surfit, code, ncof)?;
        c.truncate(ncof);
        let surface = Self::assemble(ax.into_knots(), ay.into_knots(), c, kx, ky, fp);
        Ok(Outcome::with_warning(surface, warning))
    }

    /// Fits a surface to values on a rectangular grid.
    ///
    /// `z[[i, j]]` is the value at `(x[i], y[j])`, so `z` has shape
    /// `(x.len(), y.len())`.
    ///
    /// # Errors
    ///
    /// As for [`Spline2D::fit_scattered`].
    pub fn fit_grid(x: &[f64], y: &[f64], z: &Array2<f64>, config: &GridConfig) -> SplineResult<Outcome<Self>> {
        config.validate_or_error()?;
        let (kx, ky) = (config.kx, config.ky);
        let (mx, my) = (x.len(), y.len());
        validation::sample_count(mx, kx)?;
        if my <= ky {
            return Err(SplineError::validation(
                "y",
                format!("degree {ky} needs more than {ky} grid lines, got {my}"),
            ));
        }
        validation::strictly_increasing("x", x)?;
        validation::strictly_increasing("y", y)?;
        if z.dim() != (mx, my) {
            return Err(SplineError::validation(
                "z",
                format!("expected shape ({mx}, {my}), got {:?}", z.dim()),
            ));
        }
        if z.iter().any(|v| !v.is_finite()) {
            return Err(SplineError::validation("z", "non-finite value"));
        }
        let bounds = config
            .bounds
            .unwrap_or_else(|| Bounds::new(x[0], x[mx - 1], y[0], y[my - 1]));
        if !bounds.contains(x[0], y[0]) || !bounds.contains(x[mx - 1], y[my - 1]) {
            return Err(SplineError::validation("bounds", "the grid extends beyond the bounds"));
        }

        // y-major copy: value (x[ix], y[iy]) at iy * mx + ix.
        let zr: Vec<f64> = z.t().iter().copied().collect();
        let mut ax = AxisKnots::automatic(sizing::nest_grid(mx, kx));
        let mut ay = AxisKnots::automatic(sizing::nest_grid(my, ky));
        let mut c = vec![0.0; (ay.nest - ky - 1) * (ax.nest - kx - 1)];
        let mut wrk = vec![0.0; sizing::lwrk_regrid(my, mx, ky, kx, ay.nest, ax.nest)];
        let mut iwrk = vec![0; sizing::kwrk_regrid(my, mx, ay.nest, ax.nest)];
        let mut fp = 0.0;
        debug!(
            "regrid: mx = {mx}, my = {my}, kx = {kx}, ky = {ky}, s = {}, lwrk = {}",
            config.smoothing,
            wrk.len()
        );
        let code = regrid(
            0,
            y,
            x,
            &zr,
            bounds.yb,
            bounds.ye,
            bounds.xb,
            bounds.xe,
            ky,
            kx,
            config.smoothing,
            ay.nest,
            ax.nest,
            &mut ay.n,
            &mut ay.t,
            &mut ax.n,
            &mut ax.t,
            &mut c,
            &mut fp,
            &mut wrk,
            &mut iwrk,
        );
        debug!("regrid: status {code}, nx = {}, ny = {}, fp = {fp:.6e}", ax.n, ay.n);

        let ncof = ax.n.saturating_sub(kx + 1) * ay.n.saturating_sub(ky + 1);
        let warning = status::translate(Routine::Regrid, code, ncof)?;
        c.truncate(ncof);
        let surface = Self::assemble(ax.into_knots(), ay.into_knots(), c, kx, ky, fp);
        Ok(Outcome::with_warning(surface, warning))
    }

    /// Rebuilds a surface from full knot vectors and x-fastest coefficients.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the parts are inconsistent.
    pub fn from_parts(
        tx: Vec<f64>,
        ty: Vec<f64>,
        coefficients: Vec<f64>,
        kx: usize,
        ky: usize,
        residual: f64,
    ) -> SplineResult<Self> {
        for (field, t, k) in [("tx", &tx, kx), ("ty", &ty, ky)] {
            if !(1..=MAX_DEGREE).contains(&k) {
                return Err(SplineError::validation(
                    field,
                    format!("degree must be between 1 and {MAX_DEGREE}, got {k}"),
                ));
            }
            if t.len() < 2 * k + 2 {
                return Err(SplineError::validation(
                    field,
                    format!("degree {k} needs at least {} knots, got {}", 2 * k + 2, t.len()),
                ));
            }
            validation::non_decreasing(field, t)?;
        }
        let ncof = (tx.len() - kx - 1) * (ty.len() - ky - 1);
        validation::lengths("coefficients", ncof, coefficients.len())?;
        validation::finite("coefficients", &coefficients)?;
        Ok(Self::assemble(tx, ty, coefficients, kx, ky, residual))
    }

    fn assemble(tx: Vec<f64>, ty: Vec<f64>, coefficients: Vec<f64>, kx: usize, ky: usize, residual: f64) -> Self {
        Self {
            tx,
            ty,
            coefficients,
            kx,
            ky,
            residual,
        }
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Length of the buffer taken by [`Spline2D::evaluate_point_with`].
    pub fn point_workspace_len(&self) -> usize {
        sizing::lwrk_bispev(1, 1, self.kx, self.ky)
    }

    /// Value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::OutOfDomain`] outside the domain.
    pub fn evaluate_point(&self, x: f64, y: f64) -> SplineResult<f64> {
        let mut wrk = vec![0.0; self.point_workspace_len()];
        self.evaluate_point_with(x, y, &mut wrk)
    }

    /// Shorthand for [`Spline2D::evaluate_point`].
    ///
    /// # Errors
    ///
    /// As for [`Spline2D::evaluate_point`].
    pub fn at(&self, x: f64, y: f64) -> SplineResult<f64> {
        self.evaluate_point(x, y)
    }

    /// [`Spline2D::evaluate_point`] with a caller buffer of exactly
    /// `kx + ky + 2` values, for repeated single-point evaluation.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a buffer of any other length.
    pub fn evaluate_point_with(&self, x: f64, y: f64, wrk: &mut [f64]) -> SplineResult<f64> {
        validation::lengths("wrk", self.point_workspace_len(), wrk.len())?;
        self.check_domain(&[x], &[y])?;
        let mut z = [0.0];
        let mut iwrk = [0; 2];
        let code = bispev(
            &self.ty,
            self.ty.len(),
            &self.tx,
            self.tx.len(),
            &self.coefficients,
            self.ky,
            self.kx,
            &[y],
            &[x],
            &mut z,
            wrk,
            &mut iwrk,
        );
        status::translate(Routine::Bispev, code, 0)?;
        Ok(z[0])
    }

    /// Values at the paired points `(xs[i], ys[i])`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for slices of different length, and the
    /// errors of [`Spline2D::evaluate_point`].
    pub fn evaluate(&self, xs: &[f64], ys: &[f64]) -> SplineResult<Vec<f64>> {
        validation::lengths("ys", xs.len(), ys.len())?;
        let mut wrk = vec![0.0; self.point_workspace_len()];
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| self.evaluate_point_with(x, y, &mut wrk))
            .collect()
    }

    /// Values on the grid `xs` by `ys`, shape `(xs.len(), ys.len())`.
    ///
    /// The array is column-major, so x varies fastest in memory. Both
    /// slices must be non-decreasing.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unsorted input and
    /// [`SplineError::OutOfDomain`] for points outside the domain.
    pub fn evaluate_grid(&self, xs: &[f64], ys: &[f64]) -> SplineResult<Array2<f64>> {
        let (mx, my) = (xs.len(), ys.len());
        validation::non_decreasing("xs", xs)?;
        validation::non_decreasing("ys", ys)?;
        if mx == 0 || my == 0 {
            return Ok(Array2::zeros((mx, my).f()));
        }
        self.check_domain(xs, ys)?;
        let mut z = vec![0.0; mx * my];
        let mut wrk = vec![0.0; sizing::lwrk_bispev(my, mx, self.ky, self.kx)];
        let mut iwrk = vec![0; sizing::kwrk_grid_eval(my, mx)];
        let code = bispev(
            &self.ty,
            self.ty.len(),
            &self.tx,
            self.tx.len(),
            &self.coefficients,
            self.ky,
            self.kx,
            ys,
            xs,
            &mut z,
            &mut wrk,
            &mut iwrk,
        );
        status::translate(Routine::Bispev, code, 0)?;
        column_major(z, mx, my)
    }

    /// Partial derivative of order `(nux, nuy)` on the grid `xs` by `ys`.
    ///
    /// Each order must be below the degree on its axis. The result has the
    /// layout of [`Spline2D::evaluate_grid`].
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::DerivativeOrder`] for an unsupported order,
    /// and the errors of [`Spline2D::evaluate_grid`].
    pub fn derivative(&self, xs: &[f64], ys: &[f64], nux: usize, nuy: usize) -> SplineResult<Array2<f64>> {
        if nux >= self.kx {
            return Err(SplineError::derivative_order(nux, 0, self.kx - 1));
        }
        if nuy >= self.ky {
            return Err(SplineError::derivative_order(nuy, 0, self.ky - 1));
        }
        let (mx, my) = (xs.len(), ys.len());
        validation::non_decreasing("xs", xs)?;
        validation::non_decreasing("ys", ys)?;
        if mx == 0 || my == 0 {
            return Ok(Array2::zeros((mx, my).f()));
        }
        self.check_domain(xs, ys)?;
        let (nx, ny) = (self.tx.len(), self.ty.len());
        let mut z = vec![0.0; mx * my];
        let mut wrk = vec![0.0; sizing::lwrk_parder(my, mx, self.ky, self.kx, nuy, nux, ny, nx)];
        let mut iwrk = vec![0; sizing::kwrk_grid_eval(my, mx)];
        let code = parder(
            &self.ty,
            ny,
            &self.tx,
            nx,
            &self.coefficients,
            self.ky,
            self.kx,
            nuy,
            nux,
            ys,
            xs,
            &mut z,
            &mut wrk,
            &mut iwrk,
        );
        status::translate(Routine::Parder, code, 0)?;
        column_major(z, mx, my)
    }

    /// Double integral over `[xb, xe] x [yb, ye]`, clamped to the domain.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError::Evaluation`] if the quadrature rejects the
    /// surface.
    pub fn integrate(&self, xb: f64, xe: f64, yb: f64, ye: f64) -> SplineResult<f64> {
        let (nx, ny) = (self.tx.len(), self.ty.len());
        let mut wrk = vec![0.0; sizing::scratch_dblint(ny, nx, self.ky, self.kx)];
        let value = dblint(
            &self.ty,
            ny,
            &self.tx,
            nx,
            &self.coefficients,
            self.ky,
            self.kx,
            yb,
            ye,
            xb,
            xe,
            &mut wrk,
        );
        if value.is_nan() && [xb, xe, yb, ye].iter().all(|v| !v.is_nan()) {
            return status::translate(Routine::Dblint, 10, 0).map(|_| value);
        }
        Ok(value)
    }

    fn check_domain(&self, xs: &[f64], ys: &[f64]) -> SplineResult<()> {
        let d = self.domain();
        if let Some(&x) = xs.iter().find(|&&x| !(d.xb..=d.xe).contains(&x)) {
            return Err(SplineError::out_of_domain(x, d.xb, d.xe));
        }
        if let Some(&y) = ys.iter().find(|&&y| !(d.yb..=d.ye).contains(&y)) {
            return Err(SplineError::out_of_domain(y, d.yb, d.ye));
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Interior knots along x.
    pub fn knots_x(&self) -> &[f64] {
        &self.tx[self.kx + 1..self.tx.len() - self.kx - 1]
    }

    /// Interior knots along y.
    pub fn knots_y(&self) -> &[f64] {
        &self.ty[self.ky + 1..self.ty.len() - self.ky - 1]
    }

    /// Full knot vector along x.
    pub fn all_knots_x(&self) -> &[f64] {
        &self.tx
    }

    /// Full knot vector along y.
    pub fn all_knots_y(&self) -> &[f64] {
        &self.ty
    }

    /// Coefficients, x fastest.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of the B-spline pair `(ix, iy)`.
    pub fn coefficient(&self, ix: usize, iy: usize) -> Option<f64> {
        let ncx = self.tx.len() - self.kx - 1;
        if ix >= ncx {
            return None;
        }
        self.coefficients.get(iy * ncx + ix).copied()
    }

    /// Degrees `(kx, ky)`.
    pub fn degrees(&self) -> (usize, usize) {
        (self.kx, self.ky)
    }

    /// Weighted sum of squared residuals of the fit.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Rectangle spanned by the boundary knots.
    pub fn domain(&self) -> Bounds {
        let (nx, ny) = (self.tx.len(), self.ty.len());
        Bounds::new(self.tx[self.kx], self.tx[nx - self.kx - 1], self.ty[self.ky], self.ty[ny - self.ky - 1])
    }
}

fn column_major(z: Vec<f64>, mx: usize, my: usize) -> SplineResult<Array2<f64>> {
    Array2::from_shape_vec((mx, my).f(), z).map_err(|e| SplineError::validation("grid", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane_grid() -> (Vec<f64>, Vec<f64>, Array2<f64>) {
        let x: Vec<f64> = (0..5).map(f64::from).collect();
        let y: Vec<f64> = (0..4).map(|j| f64::from(j) * 0.5).collect();
        let z = Array2::from_shape_fn((5, 4), |(i, j)| x[i] + 10.0 * y[j]);
        (x, y, z)
    }

    #[test]
    fn test_grid_coefficients_are_x_fastest() {
        let (x, y, z) = plane_grid();
        let config = GridConfig::new().with_degrees(1, 1);
        let surface = Spline2D::fit_grid(&x, &y, &z, &config).unwrap().into_value();
        // Linear interpolation: one coefficient per grid value.
        assert_eq!(surface.coefficients().len(), 20);
        for i in 0..5 {
            for j in 0..4 {
                assert_relative_eq!(surface.coefficient(i, j).unwrap(), z[[i, j]], epsilon = 1e-10);
                assert_relative_eq!(surface.coefficients()[j * 5 + i], z[[i, j]], epsilon = 1e-10);
            }
        }
        assert_eq!(surface.coefficient(5, 0), None);
    }

    #[test]
    fn test_grid_evaluation_layout() {
        let (x, y, z) = plane_grid();
        let surface = Spline2D::fit_grid(&x, &y, &z, &GridConfig::new()).unwrap().into_value();
        let xs = [0.5, 1.5, 3.25];
        let ys = [0.1, 1.2];
        let grid = surface.evaluate_grid(&xs, &ys).unwrap();
        assert_eq!(grid.dim(), (3, 2));
        assert!(grid.t().is_standard_layout());
        for (i, &xv) in xs.iter().enumerate() {
            for (j, &yv) in ys.iter().enumerate() {
                assert_eq!(grid[[i, j]], surface.evaluate_point(xv, yv).unwrap());
                assert_relative_eq!(grid[[i, j]], xv + 10.0 * yv, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_point_workspace_contract() {
        let (x, y, z) = plane_grid();
        let surface = Spline2D::fit_grid(&x, &y, &z, &GridConfig::new().with_degrees(3, 2)).unwrap().into_value();
        assert_eq!(surface.point_workspace_len(), 7);
        let mut wrk = vec![0.0; 7];
        assert_relative_eq!(surface.evaluate_point_with(1.0, 0.5, &mut wrk).unwrap(), 6.0, epsilon = 1e-9);
        let mut short = vec![0.0; 6];
        assert!(surface.evaluate_point_with(1.0, 0.5, &mut short).unwrap_err().is_validation());
        assert_eq!(surface.at(9.0, 0.5), Err(SplineError::out_of_domain(9.0, 0.0, 4.0)));
    }

    #[test]
    fn test_derivatives_and_integral_of_plane() {
        let (x, y, z) = plane_grid();
        let surface = Spline2D::fit_grid(&x, &y, &z, &GridConfig::new().with_degrees(2, 2)).unwrap().into_value();
        let dx = surface.derivative(&[1.0, 2.0], &[0.5], 1, 0).unwrap();
        assert_relative_eq!(dx[[1, 0]], 1.0, epsilon = 1e-9);
        let dy = surface.derivative(&[1.0], &[0.5, 1.0], 0, 1).unwrap();
        assert_relative_eq!(dy[[0, 1]], 10.0, epsilon = 1e-9);
        assert_eq!(
            surface.derivative(&[1.0], &[0.5], 2, 0),
            Err(SplineError::derivative_order(2, 0, 1))
        );
        // Integral of x + 10y over [0, 4] x [0, 1.5]: 8 * 1.5 + 10 * 4 * 1.125.
        assert_relative_eq!(surface.integrate(0.0, 4.0, 0.0, 1.5).unwrap(), 57.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scattered_bilinear_fit() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..6 {
            for j in 0..5 {
                x.push(f64::from(i) / 5.0);
                y.push(f64::from(j) / 4.0 + 0.01 * f64::from(i));
            }
        }
        let z: Vec<f64> = x.iter().zip(&y).map(|(a, b)| 1.0 + 2.0 * a - b + a * b).collect();
        let config = SurfaceConfig::new().with_degrees(1, 1).with_smoothing(1e-8);
        let surface = Spline2D::fit_scattered(&x, &y, &z, &config).unwrap().into_value();
        assert!(surface.residual() < 1e-8);
        let v = surface.at(0.5, 0.5).unwrap();
        assert_relative_eq!(v, 1.0 + 1.0 - 0.5 + 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_scattered_rejects_too_few_points() {
        let x = [0.0, 1.0, 0.0, 1.0];
        let y = [0.0, 0.0, 1.0, 1.0];
        let z = [0.0; 4];
        let config = SurfaceConfig::new().with_degrees(1, 1);
        assert!(Spline2D::fit_scattered(&x, &y, &z, &config).unwrap_err().is_validation());
    }
}
