//! Data checks that run before any fitting routine is called.

use splinefit_fitpack::fpchec;

use crate::error::{SplineError, SplineResult};
use crate::sizing;

pub(crate) fn lengths(field: &str, expected: usize, actual: usize) -> SplineResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SplineError::validation(
            field,
            format!("expected {expected} values, got {actual}"),
        ))
    }
}

pub(crate) fn finite(field: &str, values: &[f64]) -> SplineResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(i) => Err(SplineError::validation(
            field,
            format!("non-finite value {} at index {i}", values[i]),
        )),
    }
}

pub(crate) fn strictly_increasing(field: &str, values: &[f64]) -> SplineResult<()> {
    finite(field, values)?;
    match values.windows(2).position(|p| p[1] <= p[0]) {
        None => Ok(()),
        Some(i) => Err(SplineError::validation(
            field,
            format!(
                "values must be strictly increasing, got {} then {} at index {}",
                values[i],
                values[i + 1],
                i + 1
            ),
        )),
    }
}

pub(crate) fn non_decreasing(field: &str, values: &[f64]) -> SplineResult<()> {
    finite(field, values)?;
    match values.windows(2).position(|p| p[1] < p[0]) {
        None => Ok(()),
        Some(i) => Err(SplineError::validation(
            field,
            format!("values must be non-decreasing, violated at index {}", i + 1),
        )),
    }
}

/// Returns the weights, or uniform ones when none are given.
pub(crate) fn weights(weights: Option<&[f64]>, m: usize) -> SplineResult<Vec<f64>> {
    let Some(w) = weights else {
        return Ok(vec![1.0; m]);
    };
    lengths("weights", m, w.len())?;
    match w.iter().position(|&wi| !(wi.is_finite() && wi > 0.0)) {
        None => Ok(w.to_vec()),
        Some(i) => Err(SplineError::validation(
            "weights",
            format!("weights must be strictly positive, got {} at index {i}", w[i]),
        )),
    }
}

pub(crate) fn sample_count(m: usize, k: usize) -> SplineResult<()> {
    if m > k {
        Ok(())
    } else {
        Err(SplineError::validation(
            "x",
            format!("degree {k} needs more than {k} samples, got {m}"),
        ))
    }
}

pub(crate) fn periodic_ends(field: &str, first: &[f64], last: &[f64]) -> SplineResult<()> {
    if first == last {
        Ok(())
    } else {
        Err(SplineError::validation(
            field,
            format!("periodic data must end where it starts, got {first:?} and {last:?}"),
        ))
    }
}

/// Builds the full knot vector for a fixed-knot fit and checks it.
///
/// Interior knots must lie strictly inside `(u[0], u[m-1])`. Open curves
/// must also satisfy the Schoenberg-Whitney conditions; periodic curves
/// need fewer coefficients than distinct samples.
pub(crate) fn explicit_knots(u: &[f64], interior: &[f64], k: usize, periodic: bool) -> SplineResult<Vec<f64>> {
    let m = u.len();
    strictly_increasing("knots", interior)?;
    let (ub, ue) = (u[0], u[m - 1]);
    if let Some(&bad) = interior.iter().find(|&&t| t <= ub || t >= ue) {
        return Err(SplineError::validation(
            "knots",
            format!("interior knot {bad} is not strictly inside ({ub}, {ue})"),
        ));
    }
    let n = sizing::nest_explicit(interior.len(), k);
    let mut t = vec![0.0; n];
    t[k + 1..n - k - 1].copy_from_slice(interior);
    if periodic {
        if interior.len() + 2 > m {
            return Err(SplineError::validation(
                "knots",
                format!("{} interior knots leave more coefficients than the {} distinct samples", interior.len(), m - 1),
            ));
        }
        return Ok(t);
    }
    if n > m + k + 1 {
        return Err(SplineError::validation(
            "knots",
            format!("{} interior knots exceed the {} allowed for {m} samples", interior.len(), m - k - 1),
        ));
    }
    t[..=k].fill(ub);
    t[n - k - 1..].fill(ue);
    if fpchec(u, &t, n, k) != 0 {
        return Err(SplineError::validation(
            "knots",
            "knots violate the Schoenberg-Whitney conditions for the samples",
        ));
    }
    Ok(t)
}

/// Normalized cumulative chord length of points stored as columns of
/// `coords` (one slice per dimension).
pub(crate) fn chord_parameters(coords: &[&[f64]], m: usize) -> SplineResult<Vec<f64>> {
    let mut u = Vec::with_capacity(m);
    u.push(0.0);
    let mut total = 0.0;
    for i in 1..m {
        let step: f64 = coords.iter().map(|c| (c[i] - c[i - 1]).powi(2)).sum::<f64>().sqrt();
        total += step;
        u.push(total);
    }
    if total <= 0.0 {
        return Err(SplineError::validation("points", "all points coincide"));
    }
    for v in &mut u {
        *v /= total;
    }
    strictly_increasing("points", &u).map_err(|_| {
        SplineError::validation("points", "consecutive points must be distinct for chord-length parameters")
    })?;
    Ok(u)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonicity_checks() {
        assert!(strictly_increasing("x", &[0.0, 1.0, 2.0]).is_ok());
        assert!(strictly_increasing("x", &[0.0, 1.0, 1.0]).is_err());
        assert!(strictly_increasing("x", &[0.0, f64::NAN]).is_err());
        assert!(non_decreasing("x", &[0.0, 1.0, 1.0]).is_ok());
        assert!(non_decreasing("x", &[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_weights() {
        assert_eq!(weights(None, 3).unwrap(), vec![1.0; 3]);
        assert!(weights(Some(&[1.0, -1.0, 1.0]), 3).is_err());
        assert!(weights(Some(&[1.0, 1.0]), 3).is_err());
    }

    #[test]
    fn test_explicit_knots() {
        let u: Vec<f64> = (0..10).map(f64::from).collect();
        let t = explicit_knots(&u, &[3.0, 6.0], 3, false).unwrap();
        assert_eq!(t, vec![0.0, 0.0, 0.0, 0.0, 3.0, 6.0, 9.0, 9.0, 9.0, 9.0]);

        assert!(explicit_knots(&u, &[0.0, 6.0], 3, false).is_err());
        assert!(explicit_knots(&u, &[6.0, 3.0], 3, false).is_err());
        // The B-spline on [4.1, 4.5] has no sample inside its support.
        assert!(explicit_knots(&u, &[4.1, 4.2, 4.3, 4.4, 4.5], 3, false).is_err());
        assert!(explicit_knots(&u, &[1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5], 3, false).is_err());

        let t = explicit_knots(&u, &[4.5], 3, true).unwrap();
        assert_eq!(t.len(), 9);
        assert_eq!(t[4], 4.5);
    }

    #[test]
    fn test_chord_parameters() {
        let x = [0.0, 3.0, 3.0];
        let y = [0.0, 4.0, 9.0];
        let u = chord_parameters(&[&x, &y], 3).unwrap();
        assert_eq!(u, vec![0.0, 0.5, 1.0]);
        assert!(chord_parameters(&[&[1.0, 1.0, 2.0]], 3).is_err());
    }
}
