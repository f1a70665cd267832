//! Tensor-product spline surfaces over scattered data.
//!
//! The first axis (`x` here) is the slow axis of every coefficient array:
//! coefficient `(i, j)` lives at `c[i*(ny-ky-1) + j]`, and gridded outputs
//! are stored as `z[i*my + j]`.

use nalgebra::DMatrix;

use crate::bspline::{bspline_integrals, derivative_coefficients, find_interval, fpbspl};
use crate::knots::{fpknot, interior_counts, set_open_boundary};
use crate::lsq::{self, LsqSolution, Smoothing, TOL};

/// Values at the front of `wrk1` that carry state between `surfit` calls:
/// the polynomial residual and a flag telling whether it is valid.
const HEADER: usize = 2;

/// Residual relative to `sum((w z)^2)` below which an `s == 0` fit counts
/// as exact.
const EXACT: f64 = 1e-12;

/// Band widths `(b1, b2)` of the observation system for `u x v` coefficients.
fn band_widths(u: usize, v: usize, kx: usize, ky: usize) -> (usize, usize) {
    let bx = kx * v + ky + 1;
    let by = ky * u + kx + 1;
    if bx <= by {
        (bx, bx + v - ky)
    } else {
        (by, by + u - kx)
    }
}

fn lwrk1_min(m: usize, kx: usize, ky: usize, nxest: usize, nyest: usize) -> usize {
    let u = nxest - kx - 1;
    let v = nyest - ky - 1;
    let km = kx.max(ky) + 1;
    let ne = nxest.max(nyest);
    let (b1, b2) = band_widths(u, v, kx, ky);
    u * v * (2 + b1 + b2) + 2 * (u + v + km * (m + ne) + ne - kx - ky) + b2 + 1
}

/// Size of `wrk2` needed to resolve a rank-deficient system at `nx x ny` knots.
fn lwrk2_min(nx: usize, ny: usize, kx: usize, ky: usize) -> usize {
    let u = nx - kx - 1;
    let v = ny - ky - 1;
    let (_, b2) = band_widths(u, v, kx, ky);
    u * v * (b2 + 1) + b2
}

/// Smoothing spline surface through scattered data `(x, y, z)`.
///
/// * `iopt`: -1 least-squares fit on the knots in `tx[..nx]`, `ty[..ny]`;
///   0 fresh fit; 1 continue from the knots and the state left in `wrk1`
///   by an earlier call.
/// * `eps`: singular values below `eps * sigma_max` count as zero.
/// * `c` needs `(nxest-kx-1)(nyest-ky-1)` values.
/// * `wrk1` needs
///   `u v (2+b1+b2) + 2 (u+v+km (m+ne)+ne-kx-ky) + b2 + 1` values with
///   `u = nxest-kx-1`, `v = nyest-ky-1`, `km = max(kx,ky)+1`,
///   `ne = max(nxest,nyest)` and band widths `b1 <= b2` as documented in
///   the crate root. `iwrk` needs `m + (nxest-2kx-1)(nyest-2ky-1)`.
/// * `wrk2` is only touched when the system is rank deficient.
///
/// Status: 0 normal, -2 least-squares polynomial, `-rank` (below -2) for a
/// rank-deficient minimum-norm solution, 1 `nxest`/`nyest` too small,
/// 2 lost bracket, 3 iteration cap, 4 more coefficients than data points,
/// 5 no data left to place a knot, 10 invalid input. A status above 10 is
/// the `wrk2` length required to continue: the current knots are left in
/// `tx`/`ty` and the call can be repeated with `iopt = 1`.
#[allow(clippy::too_many_arguments)]
pub fn surfit(
    iopt: i32,
    x: &[f64],
    y: &[f64],
    z: &[f64],
    w: &[f64],
    xb: f64,
    xe: f64,
    yb: f64,
    ye: f64,
    kx: usize,
    ky: usize,
    s: f64,
    nxest: usize,
    nyest: usize,
    eps: f64,
    nx: &mut usize,
    tx: &mut [f64],
    ny: &mut usize,
    ty: &mut [f64],
    c: &mut [f64],
    fp: &mut f64,
    wrk1: &mut [f64],
    wrk2: &mut [f64],
    iwrk: &mut [i32],
) -> i32 {
    let m = x.len();
    if !(-1..=1).contains(&iopt) || !(1..=5).contains(&kx) || !(1..=5).contains(&ky) {
        return 10;
    }
    if nxest < 2 * kx + 2 || nyest < 2 * ky + 2 || m < (kx + 1) * (ky + 1) {
        return 10;
    }
    if y.len() < m || z.len() < m || w.len() < m || !(eps > 0.0 && eps < 1.0) || s < 0.0 {
        return 10;
    }
    if xb >= xe || yb >= ye || tx.len() < nxest || ty.len() < nyest {
        return 10;
    }
    if c.len() < (nxest - kx - 1) * (nyest - ky - 1)
        || wrk1.len() < lwrk1_min(m, kx, ky, nxest, nyest)
        || iwrk.len() < m + (nxest - 2 * kx - 1) * (nyest - 2 * ky - 1)
    {
        return 10;
    }
    for i in 0..m {
        if w[i] <= 0.0 || x[i] < xb || x[i] > xe || y[i] < yb || y[i] > ye {
            return 10;
        }
    }
    let data = ScatteredData {
        x: &x[..m],
        y: &y[..m],
        z: &z[..m],
        w: &w[..m],
        kx,
        ky,
        bounds: [xb, xe, yb, ye],
        eps,
    };
    let mut knots = KnotPair {
        nx: *nx,
        ny: *ny,
        tx,
        ty,
    };
    let status = data.fit(iopt, s, nxest, nyest, &mut knots, c, fp, wrk1, wrk2, iwrk);
    *nx = knots.nx;
    *ny = knots.ny;
    status
}

struct KnotPair<'a> {
    nx: usize,
    ny: usize,
    tx: &'a mut [f64],
    ty: &'a mut [f64],
}

impl KnotPair<'_> {
    fn ncof(&self, kx: usize, ky: usize) -> usize {
        (self.nx - kx - 1) * (self.ny - ky - 1)
    }
}

struct ScatteredData<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: &'a [f64],
    w: &'a [f64],
    kx: usize,
    ky: usize,
    bounds: [f64; 4],
    eps: f64,
}

impl ScatteredData<'_> {
    fn set_boundary(&self, knots: &mut KnotPair<'_>) {
        let [xb, xe, yb, ye] = self.bounds;
        set_open_boundary(knots.tx, knots.nx, self.kx, xb, xe);
        set_open_boundary(knots.ty, knots.ny, self.ky, yb, ye);
    }

    /// Weighted observation matrix; records the panel of every point in `panel`.
    fn system(&self, knots: &KnotPair<'_>, panel: &mut [i32]) -> (DMatrix<f64>, DMatrix<f64>) {
        let (kx, ky) = (self.kx, self.ky);
        let m = self.x.len();
        let ncy = knots.ny - ky - 1;
        let nry = knots.ny - 2 * ky - 1;
        let mut a = DMatrix::zeros(m, knots.ncof(kx, ky));
        let mut z = DMatrix::zeros(m, 1);
        let mut hx = [0.0_f64; 6];
        let mut hy = [0.0_f64; 6];
        for r in 0..m {
            let lx = find_interval(knots.tx, knots.nx, kx, self.x[r]);
            let ly = find_interval(knots.ty, knots.ny, ky, self.y[r]);
            fpbspl(knots.tx, kx, self.x[r], lx, &mut hx);
            fpbspl(knots.ty, ky, self.y[r], ly, &mut hy);
            for i in 0..=kx {
                for j in 0..=ky {
                    let col = (lx - kx + i) * ncy + (ly - ky + j);
                    a[(r, col)] = self.w[r] * hx[i] * hy[j];
                }
            }
            z[(r, 0)] = self.w[r] * self.z[r];
            panel[r] = ((lx - kx) * nry + (ly - ky)) as i32;
        }
        (a, z)
    }

    /// Solves the system, failing with the required `wrk2` length when it
    /// is rank deficient and `wrk2` cannot hold the reduced problem, or with
    /// status 10 when the decomposition cannot produce a solution.
    fn solve_checked(
        &self,
        a: &DMatrix<f64>,
        z: &DMatrix<f64>,
        penalty: Option<(&DMatrix<f64>, f64)>,
        knots: &KnotPair<'_>,
        wrk2: &mut [f64],
    ) -> Result<LsqSolution, i32> {
        let sol = lsq::solve(a, z, penalty, self.eps)?;
        let ncof = a.ncols();
        if sol.rank < ncof {
            let need = lwrk2_min(knots.nx, knots.ny, self.kx, self.ky);
            if wrk2.len() < need {
                log::trace!("surfit: rank {} of {ncof}, wrk2 needs {need}", sol.rank);
                return Err(need as i32);
            }
            let stored = sol.singular_values.len().min(need);
            wrk2[..stored].copy_from_slice(&sol.singular_values[..stored]);
        }
        Ok(sol)
    }

    fn disc_matrix(&self, knots: &KnotPair<'_>) -> DMatrix<f64> {
        let (kx, ky) = (self.kx, self.ky);
        let [xb, xe, yb, ye] = self.bounds;
        let ncx = knots.nx - kx - 1;
        let ncy = knots.ny - ky - 1;
        let rows_x: Vec<isize> = (kx + 1..knots.nx - kx - 1).map(|l| l as isize).collect();
        let rows_y: Vec<isize> = (ky + 1..knots.ny - ky - 1).map(|l| l as isize).collect();
        let fac_x = lsq::disc_factor(knots.nx - 2 * kx - 1, xe - xb);
        let fac_y = lsq::disc_factor(knots.ny - 2 * ky - 1, ye - yb);
        let dx = lsq::disc(|i| knots.tx[i as usize], kx, &rows_x, ncx, |j| j as usize, fac_x);
        let dy = lsq::disc(|i| knots.ty[i as usize], ky, &rows_y, ncy, |j| j as usize, fac_y);

        let mut d = DMatrix::zeros(dx.nrows() * ncy + dy.nrows() * ncx, ncx * ncy);
        let mut row = 0;
        for r in 0..dx.nrows() {
            for j in 0..ncy {
                for i in 0..ncx {
                    d[(row, i * ncy + j)] = dx[(r, i)];
                }
                row += 1;
            }
        }
        for r in 0..dy.nrows() {
            for i in 0..ncx {
                for j in 0..ncy {
                    d[(row, i * ncy + j)] = dy[(r, j)];
                }
                row += 1;
            }
        }
        d
    }

    /// Status for a finished fit, replaced by `-rank` when the solution is
    /// rank deficient.
    fn finish(&self, status: i32, rank: usize, ncof: usize) -> i32 {
        if rank < ncof && status <= 0 {
            -(rank.max(3) as i32)
        } else {
            status
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fit(
        &self,
        iopt: i32,
        s: f64,
        nxest: usize,
        nyest: usize,
        knots: &mut KnotPair<'_>,
        c: &mut [f64],
        fp: &mut f64,
        wrk1: &mut [f64],
        wrk2: &mut [f64],
        iwrk: &mut [i32],
    ) -> i32 {
        let (kx, ky) = (self.kx, self.ky);
        let m = self.x.len();
        let (nminx, nminy) = (2 * kx + 2, 2 * ky + 2);
        let (panel, _) = iwrk.split_at_mut(m);

        if iopt == -1 {
            if knots.nx < nminx || knots.nx > nxest || knots.ny < nminy || knots.ny > nyest {
                return 10;
            }
            self.set_boundary(knots);
            let increasing = |t: &[f64]| t.windows(2).all(|p| p[0] < p[1]);
            if !increasing(&knots.tx[kx..knots.nx - kx]) || !increasing(&knots.ty[ky..knots.ny - ky]) {
                return 10;
            }
            if knots.ncof(kx, ky) > m {
                return 10;
            }
            let (a, z) = self.system(knots, panel);
            let sol = match self.solve_checked(&a, &z, None, knots, wrk2) {
                Ok(sol) => sol,
                Err(status) => return status,
            };
            *fp = lsq::residual(&a, &z, &sol.coef);
            c[..a.ncols()].copy_from_slice(sol.coef.as_slice());
            return self.finish(0, sol.rank, a.ncols());
        }

        if iopt == 0 {
            wrk1[1] = 0.0;
            knots.nx = nminx;
            knots.ny = nminy;
        } else if knots.nx < nminx || knots.nx > nxest || knots.ny < nminy || knots.ny > nyest {
            return 10;
        }

        let fp0 = if wrk1[1] != 0.0 {
            wrk1[0]
        } else {
            let mut tx = vec![0.0; nminx];
            let mut ty = vec![0.0; nminy];
            let mut poly = KnotPair {
                nx: nminx,
                ny: nminy,
                tx: &mut tx,
                ty: &mut ty,
            };
            self.set_boundary(&mut poly);
            let (a, z) = self.system(&poly, panel);
            let sol = match self.solve_checked(&a, &z, None, &poly, wrk2) {
                Ok(sol) => sol,
                Err(status) => return status,
            };
            let fp0 = lsq::residual(&a, &z, &sol.coef);
            wrk1[0] = fp0;
            wrk1[1] = 1.0;
            fp0
        };
        log::debug!("surfit: m = {m}, fp0 = {fp0:.6e}, s = {s:.6e}");

        if fp0 <= s {
            knots.nx = nminx;
            knots.ny = nminy;
            self.set_boundary(knots);
            let (a, z) = self.system(knots, panel);
            let sol = match self.solve_checked(&a, &z, None, knots, wrk2) {
                Ok(sol) => sol,
                Err(status) => return status,
            };
            *fp = lsq::residual(&a, &z, &sol.coef);
            c[..a.ncols()].copy_from_slice(sol.coef.as_slice());
            return self.finish(-2, sol.rank, a.ncols());
        }

        self.set_boundary(knots);
        let mut xs = self.x.to_vec();
        let mut ys = self.y.to_vec();
        xs.sort_by(|p, q| p.total_cmp(q));
        ys.sort_by(|p, q| p.total_cmp(q));
        let exact = EXACT * self.z.iter().zip(self.w).map(|(zi, wi)| (zi * wi).powi(2)).sum::<f64>();
        let acc = TOL * s;
        let mut cnt_x = vec![0_i32; nxest];
        let mut cnt_y = vec![0_i32; nyest];

        let (a, z, fpinf) = loop {
            let (a, z) = self.system(knots, panel);
            let sol = match self.solve_checked(&a, &z, None, knots, wrk2) {
                Ok(sol) => sol,
                Err(status) => return status,
            };
            let resid = &a * &sol.coef - &z;
            let fpn = resid.norm_squared();
            let ncof = a.ncols();
            log::trace!("surfit knot search: nx = {}, ny = {}, fp = {fpn:.6e}", knots.nx, knots.ny);
            let converged = if s > 0.0 { (fpn - s).abs() < acc } else { fpn <= exact };
            if converged {
                *fp = fpn;
                c[..ncof].copy_from_slice(sol.coef.as_slice());
                return self.finish(0, sol.rank, ncof);
            }
            if fpn < s {
                break (a, z, fpn);
            }

            let ncx = knots.nx - kx - 1;
            let ncy = knots.ny - ky - 1;
            let nrx = knots.nx - 2 * kx - 1;
            let nry = knots.ny - 2 * ky - 1;
            let (fpint_x, rest) = wrk1[HEADER..].split_at_mut(nxest);
            let fpint_y = &mut rest[..nyest];
            fpint_x[..nrx].fill(0.0);
            fpint_y[..nry].fill(0.0);
            for r in 0..m {
                let p = panel[r] as usize;
                let e = resid[(r, 0)] * resid[(r, 0)];
                fpint_x[p / nry] += e;
                fpint_y[p % nry] += e;
            }
            interior_counts(&xs, knots.tx, knots.nx, kx, &mut cnt_x);
            interior_counts(&ys, knots.ty, knots.ny, ky, &mut cnt_y);

            let x_full = knots.nx >= nxest;
            let y_full = knots.ny >= nyest;
            let x_over = (ncx + 1) * ncy > m;
            let y_over = ncx * (ncy + 1) > m;
            let x_open = !x_full && !x_over;
            let y_open = !y_full && !y_over;
            if !x_open && !y_open {
                *fp = fpn;
                c[..ncof].copy_from_slice(sol.coef.as_slice());
                return if x_over || y_over { 4 } else { 1 };
            }
            let worst = |fpint: &[f64], cnt: &[i32], nr: usize| {
                (0..nr)
                    .filter(|&j| cnt[j] > 0)
                    .map(|j| fpint[j])
                    .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            };
            let wx = if x_open { worst(fpint_x, &cnt_x, nrx) } else { None };
            let wy = if y_open { worst(fpint_y, &cnt_y, nry) } else { None };
            let added = match (wx, wy) {
                (Some(ex), Some(ey)) if ex >= ey => {
                    fpknot(&xs, knots.tx, &mut knots.nx, kx, fpint_x, &mut cnt_x)
                }
                (Some(_), None) => fpknot(&xs, knots.tx, &mut knots.nx, kx, fpint_x, &mut cnt_x),
                (_, Some(_)) => fpknot(&ys, knots.ty, &mut knots.ny, ky, fpint_y, &mut cnt_y),
                (None, None) => false,
            };
            if !added {
                *fp = fpn;
                c[..ncof].copy_from_slice(sol.coef.as_slice());
                return 5;
            }
        };

        // Smoothing phase: fp(inf) < s < fp0.
        let d = self.disc_matrix(knots);
        let colsum: f64 = (0..a.ncols()).map(|j| a.column(j).norm()).sum();
        let p_init = if colsum > 0.0 {
            a.ncols() as f64 / colsum
        } else {
            1.0
        };
        let view = &*knots;
        let outcome = lsq::smoothing_iteration(s, fp0, fpinf, p_init, |p| {
            let sol = self.solve_checked(&a, &z, Some((&d, p)), view, wrk2)?;
            Ok((lsq::residual(&a, &z, &sol.coef), sol))
        });
        let (status, sol) = match outcome {
            Smoothing::Converged(sol) => (0, sol),
            Smoothing::IterationLimit(sol) => (3, sol),
            Smoothing::Inconsistent(sol) => (2, sol),
            Smoothing::Interrupted(status) => return status,
        };
        *fp = lsq::residual(&a, &z, &sol.coef);
        c[..a.ncols()].copy_from_slice(sol.coef.as_slice());
        self.finish(status, sol.rank, a.ncols())
    }
}

/// Basis values of every evaluation point on one axis.
///
/// Writes the `k + 1` non-zero B-splines of point `i` to `h[i*(k+1)..]` and
/// its interval to `l[i]`.
fn axis_basis(t: &[f64], n: usize, k: usize, pts: &[f64], h: &mut [f64], l: &mut [i32]) {
    let k1 = k + 1;
    for (i, &p) in pts.iter().enumerate() {
        let li = find_interval(t, n, k, p);
        fpbspl(t, k, p, li, &mut h[i * k1..(i + 1) * k1]);
        l[i] = li as i32;
    }
}

#[allow(clippy::too_many_arguments)]
fn fpbisp(
    tx: &[f64],
    nx: usize,
    ty: &[f64],
    ny: usize,
    c: &[f64],
    kx: usize,
    ky: usize,
    x: &[f64],
    y: &[f64],
    z: &mut [f64],
    wrk: &mut [f64],
    iwrk: &mut [i32],
) {
    let (mx, my) = (x.len(), y.len());
    let (kx1, ky1) = (kx + 1, ky + 1);
    let ncy = ny - ky - 1;
    let (wx, rest) = wrk.split_at_mut(mx * kx1);
    let wy = &mut rest[..my * ky1];
    let (lx, ly) = iwrk.split_at_mut(mx);
    axis_basis(tx, nx, kx, x, wx, lx);
    axis_basis(ty, ny, ky, y, wy, &mut ly[..my]);
    for i in 0..mx {
        let ix = lx[i] as usize - kx;
        for j in 0..my {
            let iy = ly[j] as usize - ky;
            let mut sum = 0.0;
            for a in 0..kx1 {
                let row = (ix + a) * ncy + iy;
                for b in 0..ky1 {
                    sum += c[row + b] * wx[i * kx1 + a] * wy[j * ky1 + b];
                }
            }
            z[i * my + j] = sum;
        }
    }
}

/// Checks sorted evaluation points against a spline domain.
fn within(pts: &[f64], lo: f64, hi: f64) -> bool {
    !pts.is_empty() && pts.windows(2).all(|p| p[0] <= p[1]) && pts[0] >= lo && pts[pts.len() - 1] <= hi
}

/// Evaluates a surface on the grid `x` by `y`.
///
/// `z[i*my + j]` receives the value at `(x[i], y[j])`. Both point lists
/// must be non-decreasing and inside the knot domain. `wrk` needs
/// `mx(kx+1) + my(ky+1)` values and `iwrk` needs `mx + my`.
///
/// Status: 0 on success, 10 on invalid input.
#[allow(clippy::too_many_arguments)]
pub fn bispev(
    tx: &[f64],
    nx: usize,
    ty: &[f64],
    ny: usize,
    c: &[f64],
    kx: usize,
    ky: usize,
    x: &[f64],
    y: &[f64],
    z: &mut [f64],
    wrk: &mut [f64],
    iwrk: &mut [i32],
) -> i32 {
    let (mx, my) = (x.len(), y.len());
    if nx < 2 * kx + 2 || ny < 2 * ky + 2 || tx.len() < nx || ty.len() < ny || !(1..=5).contains(&kx) || !(1..=5).contains(&ky) {
        return 10;
    }
    if c.len() < (nx - kx - 1) * (ny - ky - 1) || z.len() < mx * my {
        return 10;
    }
    if wrk.len() < mx * (kx + 1) + my * (ky + 1) || iwrk.len() < mx + my {
        return 10;
    }
    if !within(x, tx[kx], tx[nx - kx - 1]) || !within(y, ty[ky], ty[ny - ky - 1]) {
        return 10;
    }
    fpbisp(tx, nx, ty, ny, c, kx, ky, x, y, z, wrk, iwrk);
    0
}

/// Evaluates the partial derivative of order `(nux, nuy)` on a grid.
///
/// Orders must satisfy `nux < kx` and `nuy < ky`. `wrk` needs
/// `mx(kx+1-nux) + my(ky+1-nuy) + (nx-kx-1)(ny-ky-1)` values; its tail
/// receives the coefficients of the derivative surface. `iwrk` needs
/// `mx + my`. Output layout and domain rules as for [`bispev`].
///
/// Status: 0 on success, 10 on invalid input.
#[allow(clippy::too_many_arguments)]
pub fn parder(
    tx: &[f64],
    nx: usize,
    ty: &[f64],
    ny: usize,
    c: &[f64],
    kx: usize,
    ky: usize,
    nux: usize,
    nuy: usize,
    x: &[f64],
    y: &[f64],
    z: &mut [f64],
    wrk: &mut [f64],
    iwrk: &mut [i32],
) -> i32 {
    let (mx, my) = (x.len(), y.len());
    if nux >= kx || nuy >= ky || !(1..=5).contains(&kx) || !(1..=5).contains(&ky) {
        return 10;
    }
    if nx < 2 * kx + 2 || ny < 2 * ky + 2 || tx.len() < nx || ty.len() < ny {
        return 10;
    }
    let ncx = nx - kx - 1;
    let ncy = ny - ky - 1;
    let basis_len = mx * (kx + 1 - nux) + my * (ky + 1 - nuy);
    if c.len() < ncx * ncy || z.len() < mx * my || wrk.len() < basis_len + ncx * ncy || iwrk.len() < mx + my {
        return 10;
    }
    if !within(x, tx[kx], tx[nx - kx - 1]) || !within(y, ty[ky], ty[ny - ky - 1]) {
        return 10;
    }

    let (basis, coef) = wrk.split_at_mut(basis_len);
    let coef = &mut coef[..ncx * ncy];
    coef.copy_from_slice(&c[..ncx * ncy]);
    let mut line = vec![0.0; ncx.max(ncy)];
    let mut diff = vec![0.0; ncx.max(ncy)];
    if nux > 0 {
        for j in 0..ncy {
            for i in 0..ncx {
                line[i] = coef[i * ncy + j];
            }
            derivative_coefficients(tx, nx, &line, kx, nux, &mut diff);
            for i in 0..ncx {
                coef[i * ncy + j] = diff[i];
            }
        }
    }
    if nuy > 0 {
        for i in 0..ncx - nux {
            line[..ncy].copy_from_slice(&coef[i * ncy..(i + 1) * ncy]);
            derivative_coefficients(ty, ny, &line, ky, nuy, &mut diff);
            coef[i * ncy..(i + 1) * ncy].copy_from_slice(&diff[..ncy]);
        }
    }
    // Compact to the derivative surface's (ncx-nux) x (ncy-nuy) layout.
    let dcy = ncy - nuy;
    for i in 0..ncx - nux {
        for j in 0..dcy {
            coef[i * dcy + j] = coef[i * ncy + j];
        }
    }
    fpbisp(
        &tx[nux..nx - nux],
        nx - 2 * nux,
        &ty[nuy..ny - nuy],
        ny - 2 * nuy,
        coef,
        kx - nux,
        ky - nuy,
        x,
        y,
        z,
        basis,
        iwrk,
    );
    0
}

/// Double integral of a surface over `[xb, xe] x [yb, ye]`.
///
/// Limits are clamped to the knot domain. `wrk` needs
/// `nx + ny - kx - ky - 2` values and receives the integrals of the
/// individual B-splines along each axis. Returns NaN if `wrk` is too short.
#[allow(clippy::too_many_arguments)]
pub fn dblint(
    tx: &[f64],
    nx: usize,
    ty: &[f64],
    ny: usize,
    c: &[f64],
    kx: usize,
    ky: usize,
    xb: f64,
    xe: f64,
    yb: f64,
    ye: f64,
    wrk: &mut [f64],
) -> f64 {
    let ncx = nx - kx - 1;
    let ncy = ny - ky - 1;
    if wrk.len() < ncx + ncy || c.len() < ncx * ncy {
        return f64::NAN;
    }
    let (wx, wy) = wrk.split_at_mut(ncx);
    bspline_integrals(tx, nx, kx, xb, xe, wx);
    bspline_integrals(ty, ny, ky, yb, ye, wy);
    let mut total = 0.0;
    for i in 0..ncx {
        for j in 0..ncy {
            total += c[i * ncy + j] * wx[i] * wy[j];
        }
    }
    total
}
