//! Knot placement shared by the curve and grid fitters.

/// Sets the `k + 1` repeated boundary knots on each end of an open knot vector.
pub(crate) fn set_open_boundary(t: &mut [f64], n: usize, k: usize, ub: f64, ue: f64) {
    for j in 0..=k {
        t[j] = ub;
        t[n - 1 - j] = ue;
    }
}

/// Writes the interior knots of the interpolating spline through `u`.
///
/// Odd degrees put a knot on every data point away from the ends; even
/// degrees use interval midpoints. Fills `t[k+1..m]` and returns
/// `n = m + k + 1`.
pub(crate) fn interpolation_knots(u: &[f64], k: usize, t: &mut [f64]) -> usize {
    let m = u.len();
    let k3 = k / 2;
    for i in 0..m - k - 1 {
        let j = k3 + 1 + i;
        t[k + 1 + i] = if k % 2 == 1 {
            u[j]
        } else {
            0.5 * (u[j] + u[j - 1])
        };
    }
    m + k + 1
}

/// Counts the data points strictly inside every knot interval.
pub(crate) fn interior_counts(u: &[f64], t: &[f64], n: usize, k: usize, nrdata: &mut [i32]) {
    let nrint = n - 2 * k - 1;
    nrdata[..nrint].fill(0);
    let mut j = 0;
    for &ui in u {
        while j + 1 < nrint && ui >= t[k + j + 1] {
            j += 1;
        }
        if ui > t[k + j] && ui < t[k + j + 1] {
            nrdata[j] += 1;
        }
    }
}

/// Adds one knot at the middle data point of the interval with the largest
/// residual share `fpint` among intervals that still hold data points.
///
/// `u` must be sorted. The residual share and data count of the split
/// interval are divided between the two halves. Returns `false` when no
/// interval has a data point strictly inside it.
pub(crate) fn fpknot(u: &[f64], t: &mut [f64], n: &mut usize, k: usize, fpint: &mut [f64], nrdata: &mut [i32]) -> bool {
    let nrint = *n - 2 * k - 1;
    let mut best: Option<usize> = None;
    let mut fpmax = 0.0;
    for j in 0..nrint {
        if nrdata[j] > 0 && fpint[j] > fpmax {
            fpmax = fpint[j];
            best = Some(j);
        }
    }
    let Some(number) = best else {
        return false;
    };
    let (lo, hi) = (t[k + number], t[k + number + 1]);
    let start = u.partition_point(|&v| v <= lo);
    let end = u.partition_point(|&v| v < hi);
    if end <= start {
        return false;
    }
    let maxpt = end - start;
    let ihalf = maxpt / 2;
    let knot = u[start + ihalf];

    t.copy_within(k + number + 1..*n, k + number + 2);
    t[k + number + 1] = knot;
    fpint.copy_within(number + 1..nrint, number + 2);
    nrdata.copy_within(number + 1..nrint, number + 2);
    let left = ihalf;
    let right = maxpt - ihalf - 1;
    nrdata[number] = left as i32;
    nrdata[number + 1] = right as i32;
    fpint[number] = fpmax * left as f64 / maxpt as f64;
    fpint[number + 1] = fpmax * right as f64 / maxpt as f64;
    *n += 1;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_knots_odd_and_even() {
        let u = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let mut t = vec![0.0; 12];
        assert_eq!(interpolation_knots(&u, 3, &mut t), 10);
        assert_eq!(&t[4..6], &[2.0, 3.0]);

        let mut t = vec![0.0; 12];
        assert_eq!(interpolation_knots(&u, 2, &mut t), 9);
        assert_eq!(&t[3..6], &[1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_fpknot_splits_worst_interval() {
        let u: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let k = 1;
        let mut t = vec![0.0; 8];
        let mut n = 4;
        set_open_boundary(&mut t, n, k, 0.0, 10.0);
        let mut fpint = vec![5.0; 8];
        let mut nrdata = vec![0; 8];
        interior_counts(&u, &t, n, k, &mut nrdata);
        assert_eq!(nrdata[0], 9);
        assert!(fpknot(&u, &mut t, &mut n, k, &mut fpint, &mut nrdata));
        assert_eq!(n, 5);
        assert_eq!(&t[..5], &[0.0, 0.0, 5.0, 10.0, 10.0]);
        assert_eq!(nrdata[0], 4);
        assert_eq!(nrdata[1], 4);
    }
}
