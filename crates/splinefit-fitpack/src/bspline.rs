//! B-spline basis evaluation and the one-dimensional evaluators.
//!
//! Knot vectors follow the usual layout: `t[0..=k]` and `t[n-k-1..n]` are
//! the boundary knots, and the spline domain is `[t[k], t[n-k-1]]`.

/// Gauss-Legendre nodes on `[-1, 1]`; exact for polynomials up to degree 5.
const GAUSS_NODES: [f64; 3] = [-0.774_596_669_241_483_4, 0.0, 0.774_596_669_241_483_4];
const GAUSS_WEIGHTS: [f64; 3] = [5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0];

/// Evaluates the `k + 1` non-zero B-splines of degree `k` at `x`.
///
/// `l` is the knot interval index with `t[l] <= x < t[l + 1]` (or the
/// boundary interval when extrapolating). On return `h[j]` holds the value
/// of the B-spline with index `l - k + j`.
pub fn fpbspl(t: &[f64], k: usize, x: f64, l: usize, h: &mut [f64]) {
    let mut hh = [0.0_f64; 6];
    h[0] = 1.0;
    for j in 1..=k {
        hh[..j].copy_from_slice(&h[..j]);
        h[0] = 0.0;
        for i in 0..j {
            let li = l + i + 1;
            let lj = li - j;
            let span = t[li] - t[lj];
            if span == 0.0 {
                h[i + 1] = 0.0;
                continue;
            }
            let f = hh[i] / span;
            h[i] += f * (t[li] - x);
            h[i + 1] = f * (x - t[lj]);
        }
    }
}

/// Returns the knot interval `l` in `k..=n-k-2` used to evaluate at `x`.
///
/// Points left of the domain map to the first interval and points right of
/// (or on) the last knot map to the last one.
pub fn find_interval(t: &[f64], n: usize, k: usize, x: f64) -> usize {
    let lo = k;
    let hi = n - k - 2;
    if x < t[lo + 1] {
        return lo;
    }
    if x >= t[hi] {
        return hi;
    }
    // Largest l with t[l] <= x.
    let pos = t[lo..=hi].partition_point(|&tk| tk <= x);
    lo + pos - 1
}

/// Value of the spline `(t, c, k)` at `x` without any domain handling.
pub(crate) fn value_at(t: &[f64], n: usize, c: &[f64], k: usize, x: f64) -> f64 {
    let l = find_interval(t, n, k, x);
    let mut h = [0.0_f64; 6];
    fpbspl(t, k, x, l, &mut h);
    (0..=k).map(|j| c[l - k + j] * h[j]).sum()
}

/// Evaluates a spline at the points `x`.
///
/// `e` selects the out-of-domain policy: 0 extrapolates, 1 returns zero,
/// 2 reports an error, 3 clamps to the nearest boundary.
///
/// Status: 0 on success, 1 when `e == 2` and a point lies outside the
/// domain (values computed before that point are kept), 10 on invalid
/// input.
pub fn splev(t: &[f64], n: usize, c: &[f64], k: usize, x: &[f64], y: &mut [f64], e: i32) -> i32 {
    if x.is_empty() || y.len() < x.len() || !(0..=3).contains(&e) {
        return 10;
    }
    if n < 2 * k + 2 || t.len() < n || c.len() < n - k - 1 {
        return 10;
    }
    let tb = t[k];
    let te = t[n - k - 1];
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        let mut arg = *xi;
        if arg < tb || arg > te {
            match e {
                1 => {
                    *yi = 0.0;
                    continue;
                }
                2 => return 1,
                3 => arg = arg.clamp(tb, te),
                _ => {}
            }
        }
        *yi = value_at(t, n, c, k, arg);
    }
    0
}

/// Writes the B-spline coefficients of the `nu`-th derivative into `d`.
///
/// The derivative spline has degree `k - nu`, knots `t[nu..n - nu]` and
/// `n - k - 1 - nu` coefficients.
pub(crate) fn derivative_coefficients(t: &[f64], n: usize, c: &[f64], k: usize, nu: usize, d: &mut [f64]) {
    let nc = n - k - 1;
    d[..nc].copy_from_slice(&c[..nc]);
    for j in 1..=nu {
        let deg = (k + 1 - j) as f64;
        for i in 0..nc - j {
            let span = t[i + k + 1] - t[i + j];
            d[i] = if span > 0.0 {
                deg * (d[i + 1] - d[i]) / span
            } else {
                0.0
            };
        }
    }
}

/// Evaluates the `nu`-th derivative of a spline at the points `x`.
///
/// `wrk` must hold at least `n` values; it receives the derivative
/// coefficients. The boundary policy `e` behaves as in [`splev`].
///
/// Status: 0 on success, 1 for an out-of-domain point under `e == 2`,
/// 10 on invalid input (including `nu > k`).
#[allow(clippy::too_many_arguments)]
pub fn splder(
    t: &[f64],
    n: usize,
    c: &[f64],
    k: usize,
    nu: usize,
    x: &[f64],
    y: &mut [f64],
    e: i32,
    wrk: &mut [f64],
) -> i32 {
    if nu > k || wrk.len() < n || n < 2 * k + 2 || c.len() < n - k - 1 {
        return 10;
    }
    derivative_coefficients(t, n, c, k, nu, wrk);
    splev(&t[nu..n - nu], n - 2 * nu, &wrk[..n - k - 1 - nu], k - nu, x, y, e)
}

/// Integrals of every B-spline of the knot vector over `[a, b]`.
///
/// Limits are clamped to the spline domain. `out[j]` receives the integral
/// of the B-spline with index `j`; reversed limits give negated integrals.
pub(crate) fn bspline_integrals(t: &[f64], n: usize, k: usize, a: f64, b: f64, out: &mut [f64]) {
    let nc = n - k - 1;
    out[..nc].fill(0.0);
    let (lo, hi, sign) = if a <= b { (a, b, 1.0) } else { (b, a, -1.0) };
    let lo = lo.max(t[k]);
    let hi = hi.min(t[n - k - 1]);
    if hi <= lo {
        return;
    }
    let mut h = [0.0_f64; 6];
    for l in k..n - k - 1 {
        let left = t[l].max(lo);
        let right = t[l + 1].min(hi);
        if right <= left {
            continue;
        }
        let half = 0.5 * (right - left);
        let mid = 0.5 * (right + left);
        for (node, weight) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS.iter()) {
            let x = mid + half * node;
            fpbspl(t, k, x, l, &mut h);
            for j in 0..=k {
                out[l - k + j] += sign * weight * half * h[j];
            }
        }
    }
}

/// Definite integral of a spline between `a` and `b`.
///
/// `wrk` must hold at least `n` values; on return it contains the integrals
/// of the individual B-splines. Integration outside the domain contributes
/// nothing.
pub fn splint(t: &[f64], n: usize, c: &[f64], k: usize, a: f64, b: f64, wrk: &mut [f64]) -> f64 {
    if wrk.len() < n || n < 2 * k + 2 {
        return f64::NAN;
    }
    bspline_integrals(t, n, k, a, b, wrk);
    (0..n - k - 1).map(|j| c[j] * wrk[j]).sum()
}

/// Checks the knot vector against the data abscissae.
///
/// Returns 0 when all of the following hold, otherwise 10:
/// the boundary knots are non-decreasing, the interior knots strictly
/// increase, the data lie within `[t[k], t[n-k-1]]`, and the
/// Schoenberg-Whitney conditions are met.
pub fn fpchec(x: &[f64], t: &[f64], n: usize, k: usize) -> i32 {
    let m = x.len();
    let k1 = k + 1;
    let nk1 = n.saturating_sub(k1);
    if n < 2 * k1 || nk1 > m || t.len() < n {
        return 10;
    }
    for j in 0..k {
        if t[j] > t[j + 1] || t[n - 1 - j] < t[n - 2 - j] {
            return 10;
        }
    }
    for j in k..nk1 {
        if t[j + 1] <= t[j] {
            return 10;
        }
    }
    if x[0] < t[k] || x[m - 1] > t[nk1] {
        return 10;
    }
    if x[0] >= t[k1] || x[m - 1] <= t[nk1 - 1] {
        return 10;
    }
    let mut i = 0;
    let mut l = k1;
    for j in 1..nk1.saturating_sub(1) {
        let tj = t[j];
        l += 1;
        let tl = t[l];
        loop {
            i += 1;
            if i >= m - 1 {
                return 10;
            }
            if x[i] > tj {
                break;
            }
        }
        if x[i] >= tl {
            return 10;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clamped_cubic() -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0]
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let t = clamped_cubic();
        let mut h = [0.0; 6];
        for x in [0.0, 0.3, 1.0, 1.7, 2.5, 2.99] {
            let l = find_interval(&t, t.len(), 3, x);
            fpbspl(&t, 3, x, l, &mut h);
            let sum: f64 = h[..4].iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_find_interval_boundaries() {
        let t = clamped_cubic();
        assert_eq!(find_interval(&t, 10, 3, -1.0), 3);
        assert_eq!(find_interval(&t, 10, 3, 0.5), 3);
        assert_eq!(find_interval(&t, 10, 3, 1.0), 4);
        assert_eq!(find_interval(&t, 10, 3, 3.0), 5);
        assert_eq!(find_interval(&t, 10, 3, 9.0), 5);
    }

    #[test]
    fn test_splev_reproduces_linear_function() {
        // Greville abscissae reproduce the identity for any degree.
        let t = clamped_cubic();
        let c: Vec<f64> = (0..6)
            .map(|i| (t[i + 1] + t[i + 2] + t[i + 3]) / 3.0)
            .collect();
        let x = [0.0, 0.25, 1.5, 2.75, 3.0];
        let mut y = [0.0; 5];
        assert_eq!(splev(&t, 10, &c, 3, &x, &mut y, 0), 0);
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_relative_eq!(*yi, *xi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_splev_boundary_modes() {
        let t = clamped_cubic();
        let c = vec![1.0; 6];
        let mut y = [0.0; 1];
        assert_eq!(splev(&t, 10, &c, 3, &[4.0], &mut y, 1), 0);
        assert_eq!(y[0], 0.0);
        assert_eq!(splev(&t, 10, &c, 3, &[4.0], &mut y, 2), 1);
        assert_eq!(splev(&t, 10, &c, 3, &[4.0], &mut y, 3), 0);
        assert_relative_eq!(y[0], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_splder_and_splint_of_identity() {
        let t = clamped_cubic();
        let c: Vec<f64> = (0..6)
            .map(|i| (t[i + 1] + t[i + 2] + t[i + 3]) / 3.0)
            .collect();
        let mut wrk = vec![0.0; 10];
        let mut y = [0.0; 2];
        assert_eq!(splder(&t, 10, &c, 3, 1, &[0.5, 2.5], &mut y, 0, &mut wrk), 0);
        assert_relative_eq!(y[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(y[1], 1.0, epsilon = 1e-12);

        let area = splint(&t, 10, &c, 3, 0.0, 3.0, &mut wrk);
        assert_relative_eq!(area, 4.5, epsilon = 1e-12);
        let reversed = splint(&t, 10, &c, 3, 3.0, 0.0, &mut wrk);
        assert_relative_eq!(reversed, -4.5, epsilon = 1e-12);
        // Limits beyond the domain are clamped.
        let clamped = splint(&t, 10, &c, 3, -5.0, 10.0, &mut wrk);
        assert_relative_eq!(clamped, 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_fpchec() {
        let x = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
        let t = clamped_cubic();
        assert_eq!(fpchec(&x, &t, 10, 3), 0);

        // Too few data points between knots.
        let sparse = [0.0, 0.1, 0.2, 3.0];
        assert_eq!(fpchec(&sparse, &t, 10, 3), 10);
    }
}
