//! Smoothing spline surfaces over rectangular grids.
//!
//! The grid structure makes the problem separable: with `Ax` and `Ay` the
//! per-axis observation matrices, the coefficients minimise
//! `||[Ax; Dx/p] C [Ay; Dy/p]^T - [Z 0; 0 0]||^2`, which is solved one axis
//! at a time.

use nalgebra::DMatrix;

use crate::bspline::{find_interval, fpbspl, fpchec};
use crate::knots::{fpknot, interior_counts, interpolation_knots, set_open_boundary};
use crate::lsq::{self, Smoothing, TOL};

/// Offset of the per-interval residual shares in `wrk`.
const WRK_HEADER: usize = 4;
/// Offset of the per-interval data counts in `iwrk`.
const IWRK_HEADER: usize = 3;

/// Smoothing spline surface on the grid `x` by `y`.
///
/// `z[i*my + j]` is the value at `(x[i], y[j])`. Both axes must be strictly
/// increasing and lie within `[xb, xe]` and `[yb, ye]`.
///
/// * `iopt`: -1 least-squares fit on the given knots, 0 fresh fit,
///   1 continue from the knots and state of an earlier call.
/// * `c` needs `(nxest-kx-1)(nyest-ky-1)` values and is returned with the
///   first axis slow: `c[i*(ny-ky-1) + j]`.
/// * `wrk` needs
///   `4 + nxest(my+2kx+5) + nyest(2ky+5) + mx(kx+1) + my(ky+1) + max(my, nxest)`
///   values, `iwrk` needs `3 + mx + my + nxest + nyest`.
/// * With `s == 0`, `nxest >= mx+kx+1` and `nyest >= my+ky+1`.
///
/// Status: 0 normal, -1 interpolating spline, -2 least-squares polynomial,
/// 1 `nxest`/`nyest` too small, 2 lost bracket, 3 iteration cap,
/// 10 invalid input.
#[allow(clippy::too_many_arguments)]
pub fn regrid(
    iopt: i32,
    x: &[f64],
    y: &[f64],
    z: &[f64],
    xb: f64,
    xe: f64,
    yb: f64,
    ye: f64,
    kx: usize,
    ky: usize,
    s: f64,
    nxest: usize,
    nyest: usize,
    nx: &mut usize,
    tx: &mut [f64],
    ny: &mut usize,
    ty: &mut [f64],
    c: &mut [f64],
    fp: &mut f64,
    wrk: &mut [f64],
    iwrk: &mut [i32],
) -> i32 {
    let (mx, my) = (x.len(), y.len());
    if !(-1..=1).contains(&iopt) || !(1..=5).contains(&kx) || !(1..=5).contains(&ky) {
        return 10;
    }
    if mx <= kx || my <= ky || z.len() < mx * my || s < 0.0 {
        return 10;
    }
    if nxest < 2 * kx + 2 || nyest < 2 * ky + 2 || tx.len() < nxest || ty.len() < nyest {
        return 10;
    }
    if s == 0.0 && (nxest < mx + kx + 1 || nyest < my + ky + 1) {
        return 10;
    }
    let lwrest = 4
        + nxest * (my + 2 * kx + 5)
        + nyest * (2 * ky + 5)
        + mx * (kx + 1)
        + my * (ky + 1)
        + my.max(nxest);
    if c.len() < (nxest - kx - 1) * (nyest - ky - 1)
        || wrk.len() < lwrest
        || iwrk.len() < 3 + mx + my + nxest + nyest
    {
        return 10;
    }
    let increasing = |u: &[f64]| u.windows(2).all(|p| p[0] < p[1]);
    if !increasing(x) || !increasing(y) || xb > x[0] || xe < x[mx - 1] || yb > y[0] || ye < y[my - 1] {
        return 10;
    }

    let grid = GridData {
        x,
        y,
        z: DMatrix::from_row_slice(mx, my, &z[..mx * my]),
        kx,
        ky,
        bounds: [xb, xe, yb, ye],
    };
    let mut axes = [
        Axis {
            n: *nx,
            t: tx,
            nest: nxest,
        },
        Axis {
            n: *ny,
            t: ty,
            nest: nyest,
        },
    ];
    let status = grid.fit(iopt, s, &mut axes, c, fp, wrk, iwrk).unwrap_or_else(|status| status);
    *nx = axes[0].n;
    *ny = axes[1].n;
    status
}

/// Knot vector of one grid axis.
struct Axis<'a> {
    n: usize,
    t: &'a mut [f64],
    nest: usize,
}

struct GridData<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: DMatrix<f64>,
    kx: usize,
    ky: usize,
    bounds: [f64; 4],
}

/// Coefficients and residuals of one grid solve.
struct GridSolution {
    coef: DMatrix<f64>,
    resid: DMatrix<f64>,
    fp: f64,
}

impl GridData<'_> {
    fn data(&self, axis: usize) -> &[f64] {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }

    fn degree(&self, axis: usize) -> usize {
        if axis == 0 {
            self.kx
        } else {
            self.ky
        }
    }

    fn range(&self, axis: usize) -> (f64, f64) {
        (self.bounds[2 * axis], self.bounds[2 * axis + 1])
    }

    fn nmax(&self, axis: usize) -> usize {
        self.data(axis).len() + self.degree(axis) + 1
    }

    fn set_boundary(&self, axis: usize, knots: &mut Axis<'_>) {
        let (lo, hi) = self.range(axis);
        set_open_boundary(knots.t, knots.n, self.degree(axis), lo, hi);
    }

    fn observation(&self, axis: usize, knots: &Axis<'_>) -> DMatrix<f64> {
        let u = self.data(axis);
        let k = self.degree(axis);
        let mut a = DMatrix::zeros(u.len(), knots.n - k - 1);
        let mut h = [0.0_f64; 6];
        for (i, &ui) in u.iter().enumerate() {
            let l = find_interval(knots.t, knots.n, k, ui);
            fpbspl(knots.t, k, ui, l, &mut h);
            for j in 0..=k {
                a[(i, l - k + j)] = h[j];
            }
        }
        a
    }

    /// Maps data onto coefficients along one axis: the first `m` columns of
    /// the pseudo-inverse of `[A; D/p]`.
    fn axis_operator(&self, axis: usize, knots: &Axis<'_>, p: Option<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>), i32> {
        let k = self.degree(axis);
        let a = self.observation(axis, knots);
        let m = a.nrows();
        let penalty = p.map(|p| {
            let (lo, hi) = self.range(axis);
            let rows: Vec<isize> = (k + 1..knots.n - k - 1).map(|l| l as isize).collect();
            let fac = lsq::disc_factor(knots.n - 2 * k - 1, hi - lo);
            let d = lsq::disc(|i| knots.t[i as usize], k, &rows, a.ncols(), |j| j as usize, fac);
            (d, p)
        });
        let sol = lsq::solve(&a, &DMatrix::identity(m, m), penalty.as_ref().map(|(d, p)| (d, *p)), 0.0)?;
        Ok((a, sol.coef))
    }

    fn solve(&self, axes: &[Axis<'_>; 2], p: Option<f64>) -> Result<GridSolution, i32> {
        let (ax, px) = self.axis_operator(0, &axes[0], p)?;
        let (ay, py) = self.axis_operator(1, &axes[1], p)?;
        let coef = &px * &self.z * py.transpose();
        let resid = &ax * &coef * ay.transpose() - &self.z;
        let fp = resid.norm_squared();
        Ok(GridSolution { coef, resid, fp })
    }

    fn store(&self, sol: &GridSolution, c: &mut [f64], fp: &mut f64) {
        let (ncx, ncy) = (sol.coef.nrows(), sol.coef.ncols());
        for i in 0..ncx {
            for j in 0..ncy {
                c[i * ncy + j] = sol.coef[(i, j)];
            }
        }
        *fp = sol.fp;
    }

    fn place_interpolation_knots(&self, axis: usize, knots: &mut Axis<'_>) {
        knots.n = interpolation_knots(self.data(axis), self.degree(axis), knots.t);
        self.set_boundary(axis, knots);
    }

    #[allow(clippy::too_many_arguments)]
    fn fit(
        &self,
        iopt: i32,
        s: f64,
        axes: &mut [Axis<'_>; 2],
        c: &mut [f64],
        fp: &mut f64,
        wrk: &mut [f64],
        iwrk: &mut [i32],
    ) -> Result<i32, i32> {
        let nmin = [2 * self.kx + 2, 2 * self.ky + 2];

        if iopt == -1 {
            for (axis, knots) in axes.iter_mut().enumerate() {
                if knots.n < nmin[axis] || knots.n > knots.nest {
                    return Ok(10);
                }
                self.set_boundary(axis, knots);
                if fpchec(self.data(axis), knots.t, knots.n, self.degree(axis)) != 0 {
                    return Ok(10);
                }
            }
            let sol = self.solve(axes, None)?;
            self.store(&sol, c, fp);
            return Ok(0);
        }

        if s == 0.0 {
            for (axis, knots) in axes.iter_mut().enumerate() {
                self.place_interpolation_knots(axis, knots);
            }
            let sol = self.solve(axes, None)?;
            self.store(&sol, c, fp);
            return Ok(-1);
        }

        if iopt == 0 {
            wrk[1] = 0.0;
            for (axis, knots) in axes.iter_mut().enumerate() {
                knots.n = nmin[axis];
            }
        } else if axes.iter().zip(nmin).any(|(knots, lo)| knots.n < lo || knots.n > knots.nest) {
            return Ok(10);
        }
        for (axis, knots) in axes.iter_mut().enumerate() {
            self.set_boundary(axis, knots);
        }

        let fp0 = if wrk[1] != 0.0 {
            wrk[0]
        } else {
            let mut tx = vec![0.0; nmin[0]];
            let mut ty = vec![0.0; nmin[1]];
            let mut poly = [
                Axis {
                    n: nmin[0],
                    t: &mut tx,
                    nest: nmin[0],
                },
                Axis {
                    n: nmin[1],
                    t: &mut ty,
                    nest: nmin[1],
                },
            ];
            for (axis, knots) in poly.iter_mut().enumerate() {
                self.set_boundary(axis, knots);
            }
            let fp0 = self.solve(&poly, None)?.fp;
            wrk[0] = fp0;
            wrk[1] = 1.0;
            fp0
        };
        log::debug!("regrid: {} x {} grid, fp0 = {fp0:.6e}, s = {s:.6e}", self.x.len(), self.y.len());

        if fp0 <= s {
            for (axis, knots) in axes.iter_mut().enumerate() {
                knots.n = nmin[axis];
                self.set_boundary(axis, knots);
            }
            let sol = self.solve(axes, None)?;
            self.store(&sol, c, fp);
            return Ok(-2);
        }

        let acc = TOL * s;
        let (fpint_x, rest) = wrk[WRK_HEADER..].split_at_mut(axes[0].nest);
        let fpint_y = &mut rest[..axes[1].nest];
        let (cnt_x, rest) = iwrk[IWRK_HEADER..].split_at_mut(axes[0].nest);
        let cnt_y = &mut rest[..axes[1].nest];

        let fpinf = loop {
            let sol = self.solve(axes, None)?;
            log::trace!("regrid knot search: nx = {}, ny = {}, fp = {:.6e}", axes[0].n, axes[1].n, sol.fp);
            if (sol.fp - s).abs() < acc {
                self.store(&sol, c, fp);
                return Ok(0);
            }
            if sol.fp < s {
                break sol.fp;
            }

            let nrx = axes[0].n - 2 * self.kx - 1;
            let nry = axes[1].n - 2 * self.ky - 1;
            fpint_x[..nrx].fill(0.0);
            fpint_y[..nry].fill(0.0);
            let lx: Vec<usize> = self
                .x
                .iter()
                .map(|&v| find_interval(axes[0].t, axes[0].n, self.kx, v) - self.kx)
                .collect();
            let ly: Vec<usize> = self
                .y
                .iter()
                .map(|&v| find_interval(axes[1].t, axes[1].n, self.ky, v) - self.ky)
                .collect();
            for (i, &ix) in lx.iter().enumerate() {
                for (j, &iy) in ly.iter().enumerate() {
                    let e = sol.resid[(i, j)] * sol.resid[(i, j)];
                    fpint_x[ix] += e;
                    fpint_y[iy] += e;
                }
            }
            interior_counts(self.x, axes[0].t, axes[0].n, self.kx, cnt_x);
            interior_counts(self.y, axes[1].t, axes[1].n, self.ky, cnt_y);

            let open = |axis: usize, knots: &Axis<'_>| knots.n < knots.nest && knots.n < self.nmax(axis);
            let worst = |fpint: &[f64], cnt: &[i32], nr: usize| {
                (0..nr)
                    .filter(|&j| cnt[j] > 0)
                    .map(|j| fpint[j])
                    .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            };
            let wx = if open(0, &axes[0]) { worst(fpint_x, cnt_x, nrx) } else { None };
            let wy = if open(1, &axes[1]) { worst(fpint_y, cnt_y, nry) } else { None };
            let axis = match (wx, wy) {
                (Some(ex), Some(ey)) => usize::from(ey > ex),
                (Some(_), None) => 0,
                (None, Some(_)) => 1,
                (None, None) => {
                    let reachable = axes.iter().enumerate().all(|(a, k)| k.nest >= self.nmax(a));
                    if !reachable {
                        self.store(&sol, c, fp);
                        return Ok(1);
                    }
                    for (a, knots) in axes.iter_mut().enumerate() {
                        self.place_interpolation_knots(a, knots);
                    }
                    let sol = self.solve(axes, None)?;
                    self.store(&sol, c, fp);
                    return Ok(-1);
                }
            };
            let (fpint, cnt): (&mut [f64], &mut [i32]) = if axis == 0 {
                (&mut *fpint_x, &mut *cnt_x)
            } else {
                (&mut *fpint_y, &mut *cnt_y)
            };
            let target = &mut axes[axis];
            fpknot(self.data(axis), target.t, &mut target.n, self.degree(axis), fpint, cnt);
            if target.n >= self.nmax(axis) {
                self.place_interpolation_knots(axis, target);
            }
        };

        // Smoothing phase: fp(inf) < s < fp0.
        let view = &*axes;
        let p_init = {
            let ncof = (view[0].n - self.kx - 1) * (view[1].n - self.ky - 1);
            ncof as f64 / self.z.len() as f64
        };
        let outcome = lsq::smoothing_iteration(s, fp0, fpinf, p_init, |p| {
            let sol = self.solve(view, Some(p))?;
            Ok((sol.fp, sol))
        });
        let (status, sol) = match outcome {
            Smoothing::Converged(sol) => (0, sol),
            Smoothing::IterationLimit(sol) => (3, sol),
            Smoothing::Inconsistent(sol) => (2, sol),
            Smoothing::Interrupted(status) => return Err(status),
        };
        self.store(&sol, c, fp);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::bispev;
    use approx::assert_relative_eq;

    struct Buffers {
        tx: Vec<f64>,
        ty: Vec<f64>,
        c: Vec<f64>,
        wrk: Vec<f64>,
        iwrk: Vec<i32>,
    }

    fn buffers(mx: usize, my: usize, kx: usize, ky: usize, nxest: usize, nyest: usize) -> Buffers {
        let lwrk = 4
            + nxest * (my + 2 * kx + 5)
            + nyest * (2 * ky + 5)
            + mx * (kx + 1)
            + my * (ky + 1)
            + my.max(nxest);
        Buffers {
            tx: vec![0.0; nxest],
            ty: vec![0.0; nyest],
            c: vec![0.0; (nxest - kx - 1) * (nyest - ky - 1)],
            wrk: vec![0.0; lwrk],
            iwrk: vec![0; 3 + mx + my + nxest + nyest],
        }
    }

    fn axis(m: usize) -> Vec<f64> {
        (0..m).map(|i| i as f64 / (m - 1) as f64).collect()
    }

    #[test]
    fn test_regrid_interpolates() {
        let (x, y) = (axis(6), axis(5));
        let mut z = Vec::new();
        for &xi in &x {
            for &yj in &y {
                z.push((3.0 * xi).sin() * (2.0 * yj).cos());
            }
        }
        let (kx, ky) = (3, 3);
        let (nxest, nyest) = (6 + kx + 1, 5 + ky + 1);
        let mut b = buffers(6, 5, kx, ky, nxest, nyest);
        let (mut nx, mut ny, mut fp) = (0, 0, 0.0);
        let ier = regrid(
            0, &x, &y, &z, 0.0, 1.0, 0.0, 1.0, kx, ky, 0.0, nxest, nyest, &mut nx, &mut b.tx, &mut ny, &mut b.ty,
            &mut b.c, &mut fp, &mut b.wrk, &mut b.iwrk,
        );
        assert_eq!(ier, -1);
        assert_eq!((nx, ny), (nxest, nyest));
        assert!(fp < 1e-18);

        let mut out = vec![0.0; 30];
        let mut wrk = vec![0.0; 6 * 4 + 5 * 4];
        let mut iwrk = vec![0; 11];
        assert_eq!(bispev(&b.tx, nx, &b.ty, ny, &b.c, kx, ky, &x, &y, &mut out, &mut wrk, &mut iwrk), 0);
        for (o, zi) in out.iter().zip(&z) {
            assert_relative_eq!(*o, *zi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_regrid_polynomial_for_large_smoothing() {
        let (x, y) = (axis(8), axis(7));
        let mut z = Vec::new();
        for &xi in &x {
            for &yj in &y {
                z.push(xi * yj);
            }
        }
        let mut b = buffers(8, 7, 3, 3, 12, 11);
        let (mut nx, mut ny, mut fp) = (0, 0, 0.0);
        let ier = regrid(
            0, &x, &y, &z, 0.0, 1.0, 0.0, 1.0, 3, 3, 0.5, 12, 11, &mut nx, &mut b.tx, &mut ny, &mut b.ty, &mut b.c,
            &mut fp, &mut b.wrk, &mut b.iwrk,
        );
        assert_eq!(ier, -2);
        assert_eq!((nx, ny), (8, 8));
        assert!(fp < 1e-20);
    }

    #[test]
    fn test_regrid_smoothing_adds_knots() {
        let (x, y) = (axis(15), axis(12));
        let mut z = Vec::new();
        for (i, &xi) in x.iter().enumerate() {
            for (j, &yj) in y.iter().enumerate() {
                let noise = if (i + j) % 2 == 0 { 0.01 } else { -0.01 };
                z.push((8.0 * xi).sin() + yj * yj + noise);
            }
        }
        let s = 0.05;
        let mut b = buffers(15, 12, 3, 3, 19, 16);
        let (mut nx, mut ny, mut fp) = (0, 0, 0.0);
        let ier = regrid(
            0, &x, &y, &z, 0.0, 1.0, 0.0, 1.0, 3, 3, s, 19, 16, &mut nx, &mut b.tx, &mut ny, &mut b.ty, &mut b.c,
            &mut fp, &mut b.wrk, &mut b.iwrk,
        );
        assert!(matches!(ier, 0 | 2 | 3), "ier = {ier}");
        assert!(nx > 8 || ny > 8);
        if ier == 0 {
            assert!((fp - s).abs() <= 1e-3 * s);
        }
    }

    #[test]
    fn test_regrid_rejects_unsorted_axis() {
        let x = [0.0, 0.5, 0.4, 1.0];
        let y = axis(4);
        let z = vec![0.0; 16];
        let mut b = buffers(4, 4, 1, 1, 6, 6);
        let (mut nx, mut ny, mut fp) = (0, 0, 0.0);
        let ier = regrid(
            0, &x, &y, &z, 0.0, 1.0, 0.0, 1.0, 1, 1, 0.0, 6, 6, &mut nx, &mut b.tx, &mut ny, &mut b.ty, &mut b.c,
            &mut fp, &mut b.wrk, &mut b.iwrk,
        );
        assert_eq!(ier, 10);
    }
}
