//! Zeros of cubic splines.

use crate::bspline::fpbspl;

/// Values within this fraction of the largest coefficient count as zero.
const ZERO_TOL: f64 = 1e-11;

/// Finds the zeros of a cubic spline in ascending order.
///
/// Each knot interval is converted to a cubic polynomial, split into
/// monotone pieces at its turning points, and each sign change is refined
/// by bisection. A piece end or turning point where the spline is zero to
/// within round-off is a root as well, which catches zeros that sit on a
/// knot and zeros where the curve only touches the axis. At most `zero.len()` roots are stored; `count` receives
/// the number stored.
///
/// Status: 0 on success, 1 if the spline has more zeros than `zero` can
/// hold (the first `zero.len()` are returned), 10 on invalid input
/// (degree other than 3 or fewer than 8 knots).
pub fn sproot(t: &[f64], n: usize, c: &[f64], k: usize, zero: &mut [f64], count: &mut usize) -> i32 {
    *count = 0;
    if k != 3 || n < 8 || t.len() < n || c.len() < n - 4 {
        return 10;
    }
    let mest = zero.len();
    let ztol = ZERO_TOL * c[..n - 4].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let mut found: Vec<f64> = Vec::new();
    let last = n - 5;
    for l in 3..=last {
        let a = t[l];
        let b = t[l + 1];
        if b <= a {
            continue;
        }
        let poly = local_cubic(t, c, l);
        let include_end = l == last;
        for s in poly_roots(&poly, ztol, include_end) {
            let x = a + (b - a) * s / 3.0;
            let tol = 1e-12 * (b - a).max(x.abs());
            if found.last().map_or(true, |&prev| x - prev > tol) {
                found.push(x);
            }
        }
    }
    let stored = found.len().min(mest);
    zero[..stored].copy_from_slice(&found[..stored]);
    *count = stored;
    if found.len() > mest {
        1
    } else {
        0
    }
}

/// Power-basis coefficients of the cubic piece on interval `l`, in the
/// local variable `s` running from 0 at `t[l]` to 3 at `t[l + 1]`.
fn local_cubic(t: &[f64], c: &[f64], l: usize) -> [f64; 4] {
    let a = t[l];
    let h = t[l + 1] - a;
    let mut v = [0.0; 4];
    let mut basis = [0.0; 6];
    for (i, vi) in v.iter_mut().enumerate() {
        let x = a + h * i as f64 / 3.0;
        fpbspl(t, 3, x, l, &mut basis);
        *vi = (0..4).map(|j| c[l - 3 + j] * basis[j]).sum();
    }
    let d1 = v[1] - v[0];
    let d2 = v[2] - 2.0 * v[1] + v[0];
    let d3 = v[3] - 3.0 * v[2] + 3.0 * v[1] - v[0];
    [v[0], d1 - d2 / 2.0 + d3 / 3.0, d2 / 2.0 - d3 / 2.0, d3 / 6.0]
}

fn horner(p: &[f64; 4], s: f64) -> f64 {
    ((p[3] * s + p[2]) * s + p[1]) * s + p[0]
}

/// Roots of `p` in `[0, 3)`, or `[0, 3]` when `include_end` is set.
/// `|p| <= ztol` at a break point counts as a root there.
fn poly_roots(p: &[f64; 4], ztol: f64, include_end: bool) -> Vec<f64> {
    let mut breaks = vec![0.0];
    // Turning points: 3 p3 s^2 + 2 p2 s + p1 = 0.
    let (qa, qb, qc) = (3.0 * p[3], 2.0 * p[2], p[1]);
    let mut turns: Vec<f64> = Vec::new();
    if qa.abs() > f64::EPSILON * (qb.abs() + qc.abs()) {
        let disc = qb * qb - 4.0 * qa * qc;
        if disc > 0.0 {
            let q = -0.5 * (qb + qb.signum() * disc.sqrt());
            if q != 0.0 {
                turns.push(q / qa);
                turns.push(qc / q);
            } else {
                turns.push(0.0);
            }
        }
    } else if qb != 0.0 {
        turns.push(-qc / qb);
    }
    turns.sort_by(|x, y| x.total_cmp(y));
    breaks.extend(turns.into_iter().filter(|&s| s > 0.0 && s < 3.0));
    breaks.push(3.0);

    let scale = p.iter().map(|v| v.abs()).fold(0.0, f64::max);
    let mut roots = Vec::new();
    if scale == 0.0 {
        return roots;
    }
    for w in breaks.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        let flo = horner(p, lo);
        let fhi = horner(p, hi);
        if flo.abs() <= ztol {
            roots.push(lo);
        } else if fhi.abs() > ztol && flo * fhi < 0.0 {
            roots.push(bisect(p, lo, hi, flo));
        }
    }
    if include_end && horner(p, 3.0).abs() <= ztol {
        roots.push(3.0);
    }
    roots
}

fn bisect(p: &[f64; 4], mut lo: f64, mut hi: f64, mut flo: f64) -> f64 {
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let fmid = horner(p, mid);
        if fmid == 0.0 {
            return mid;
        }
        if (fmid < 0.0) == (flo < 0.0) {
            lo = mid;
            flo = fmid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
