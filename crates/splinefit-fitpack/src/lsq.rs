//! Dense weighted least squares with a discontinuity penalty.
//!
//! The fitting routines minimise `||A c - z||^2 + ||D c||^2 / p^2`, where
//! `A` is the weighted observation matrix and `D` measures the jumps of the
//! highest derivative at interior knots. `p = inf` is the plain least-squares
//! spline; `p -> 0` forces a single polynomial piece.

use nalgebra::DMatrix;

/// Relative tolerance on `|fp - s|` for the smoothing-parameter iteration.
pub(crate) const TOL: f64 = 1e-3;

/// Maximum number of smoothing-parameter iterations.
pub(crate) const MAXIT: usize = 20;

const CON1: f64 = 0.1;
const CON9: f64 = 0.9;
const CON4: f64 = 0.04;

/// Solution of a (penalised) least-squares problem.
#[derive(Debug, Clone)]
pub(crate) struct LsqSolution {
    /// Coefficients, one column per right-hand side.
    pub coef: DMatrix<f64>,
    /// Numerical rank of the observation system.
    pub rank: usize,
    /// Singular values of the system, largest first.
    pub singular_values: Vec<f64>,
}

/// Solves `min ||A c - z||^2 + ||D c||^2 / p^2` in the minimum-norm sense.
///
/// `penalty` is `None` for `p = inf`. Singular values below
/// `max(eps, EPSILON * max(rows, cols)) * sigma_max` are treated as zero.
/// Fails with status 10 if the decomposition yields no solution.
pub(crate) fn solve(
    a: &DMatrix<f64>,
    z: &DMatrix<f64>,
    penalty: Option<(&DMatrix<f64>, f64)>,
    eps: f64,
) -> Result<LsqSolution, i32> {
    let (system, rhs) = match penalty {
        Some((d, p)) if d.nrows() > 0 => {
            let rows = a.nrows() + d.nrows();
            let mut system = DMatrix::zeros(rows, a.ncols());
            system.rows_mut(0, a.nrows()).copy_from(a);
            system.rows_mut(a.nrows(), d.nrows()).copy_from(&(d / p));
            let mut rhs = DMatrix::zeros(rows, z.ncols());
            rhs.rows_mut(0, z.nrows()).copy_from(z);
            (system, rhs)
        }
        _ => (a.clone(), z.clone()),
    };

    let rows = system.nrows();
    let svd = system.svd(true, true);
    let mut singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    singular_values.sort_by(|x, y| y.total_cmp(x));
    let sigma_max = singular_values.first().copied().unwrap_or(0.0);
    let threshold = eps.max(f64::EPSILON * rows.max(a.ncols()) as f64) * sigma_max;
    let rank = singular_values.iter().filter(|&&s| s > threshold).count();
    let coef = svd.solve(&rhs, threshold).map_err(|msg| {
        log::warn!("least-squares solve failed: {msg}");
        10
    })?;
    Ok(LsqSolution {
        coef,
        rank,
        singular_values,
    })
}

/// Weighted sum of squared residuals `||A c - z||^2`.
pub(crate) fn residual(a: &DMatrix<f64>, z: &DMatrix<f64>, coef: &DMatrix<f64>) -> f64 {
    (a * coef - z).norm_squared()
}

/// Jump-of-the-`k`th-derivative rows for the knot vector `t`.
///
/// `knot(i)` returns knot `i` (which may be a virtual knot outside `0..n`
/// for periodic splines), `rows` lists the knot indices at which jumps are
/// measured and `fold` maps a B-spline index onto a coefficient column.
pub(crate) fn disc<K, F>(knot: K, k: usize, rows: &[isize], ncols: usize, fold: F, fac: f64) -> DMatrix<f64>
where
    K: Fn(isize) -> f64,
    F: Fn(isize) -> usize,
{
    let k1 = k as isize + 1;
    let mut b = DMatrix::zeros(rows.len(), ncols);
    let mut h = [0.0_f64; 12];
    for (r, &l) in rows.iter().enumerate() {
        let tl = knot(l);
        for j in 0..k1 {
            h[j as usize] = tl - knot(l + j - k1);
            h[(j + k1) as usize] = tl - knot(l + j + 1);
        }
        let first = l - k1;
        for j in 0..=k1 {
            let mut prod = h[j as usize];
            for i in 1..=k as isize {
                prod *= h[(j + i) as usize] * fac;
            }
            let lp = first + j;
            let value = (knot(lp + k1) - knot(lp)) / prod;
            b[(r, fold(lp))] += value;
        }
    }
    b
}

/// Scale factor used by [`disc`]: number of intervals over the domain width.
pub(crate) fn disc_factor(intervals: usize, width: f64) -> f64 {
    intervals as f64 / width
}

/// Rational interpolation step for the smoothing parameter.
///
/// Given three points `(p1, f1)`, `(p2, f2)`, `(p3, f3)` of the decreasing
/// function `f(p) = fp(p) - s`, returns the zero of the interpolating
/// rational function and narrows the bracket. `p3 < 0` stands for infinity.
pub(crate) fn fprati(p1: &mut f64, f1: &mut f64, p2: f64, f2: f64, p3: &mut f64, f3: &mut f64) -> f64 {
    let p = if *p3 > 0.0 {
        let h1 = *f1 * (f2 - *f3);
        let h2 = f2 * (*f3 - *f1);
        let h3 = *f3 * (*f1 - f2);
        -(*p1 * p2 * h3 + p2 * *p3 * h1 + *p3 * *p1 * h2) / (*p1 * h1 + p2 * h2 + *p3 * h3)
    } else {
        (*p1 * (*f1 - *f3) * f2 - p2 * (f2 - *f3) * *f1) / ((*f1 - f2) * *f3)
    };
    if f2 < 0.0 {
        *p3 = p2;
        *f3 = f2;
    } else {
        *p1 = p2;
        *f1 = f2;
    }
    p
}

/// Outcome of the smoothing-parameter iteration.
#[derive(Debug, Clone)]
pub(crate) enum Smoothing<T> {
    /// `|fp - s|` is within tolerance.
    Converged(T),
    /// The iteration cap was reached; the last solution is kept.
    IterationLimit(T),
    /// The rational iteration lost its bracket; the last solution is kept.
    Inconsistent(T),
    /// The solver asked to stop early; carries its status.
    Interrupted(i32),
}

/// Searches for `p` with `fp(p) = s` given the polynomial residual `fp0`
/// and the least-squares residual `fpinf < s`.
///
/// `eval(p)` solves the penalised problem and returns the residual plus a
/// solution payload, or an early status to abort with.
pub(crate) fn smoothing_iteration<T, E>(s: f64, fp0: f64, fpinf: f64, p_init: f64, mut eval: E) -> Smoothing<T>
where
    E: FnMut(f64) -> Result<(f64, T), i32>,
{
    let acc = TOL * s;
    let mut p1 = 0.0;
    let mut f1 = fp0 - s;
    let mut p3 = -1.0;
    let mut f3 = fpinf - s;
    let mut p = p_init;
    let mut ich1 = false;
    let mut ich3 = false;
    for iter in 1..=MAXIT {
        let p2 = p;
        let (fp, payload) = match eval(p2) {
            Ok(result) => result,
            Err(status) => return Smoothing::Interrupted(status),
        };
        let f2 = fp - s;
        log::trace!("smoothing iteration {iter}: p = {p2:.6e}, fp = {fp:.6e}");
        if f2.abs() < acc {
            return Smoothing::Converged(payload);
        }
        if iter == MAXIT {
            return Smoothing::IterationLimit(payload);
        }
        if !ich3 {
            if f2 - f3 <= acc {
                // f(p) = s has not been bracketed from above yet.
                p3 = p2;
                f3 = f2;
                p *= CON4;
                if p <= p1 {
                    p = p1 * CON9 + p2 * CON1;
                }
                continue;
            }
            if f2 < 0.0 {
                ich3 = true;
            }
        }
        if !ich1 {
            if f1 - f2 <= acc {
                p1 = p2;
                f1 = f2;
                p /= CON4;
                if p3 >= 0.0 && p >= p3 {
                    p = p2 * CON1 + p3 * CON9;
                }
                continue;
            }
            if f2 > 0.0 {
                ich1 = true;
            }
        }
        if f2 >= f1 || f2 <= f3 {
            return Smoothing::Inconsistent(payload);
        }
        p = fprati(&mut p1, &mut f1, p2, f2, &mut p3, &mut f3);
    }
    unreachable!("the loop returns at the last iteration")
}
