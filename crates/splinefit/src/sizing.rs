//! Buffer sizes required by the fitting and evaluation routines.
//!
//! Every function here is pure arithmetic and returns the exact minimum the
//! corresponding routine checks for. Knot capacities (`nest`) are ceilings:
//! the routines may use fewer knots, and outputs are trimmed afterwards.

/// Knot capacity for an open curve fitted to `m` points.
pub fn nest_curve(m: usize, k: usize) -> usize {
    (m + k + 1).max(2 * k + 3)
}

/// Knot capacity for a periodic curve fitted to `m` points.
pub fn nest_periodic(m: usize, k: usize) -> usize {
    (m + 2 * k).max(2 * k + 3)
}

/// Knot capacity per axis for a scattered-data surface with `m` points.
pub fn nest_scattered(m: usize, k: usize) -> usize {
    let root = (m as f64 / 2.0).sqrt().ceil() as usize;
    (k + 1 + root).max(2 * k + 3)
}

/// Knot capacity for one axis of a gridded surface with `m` grid lines.
pub fn nest_grid(m: usize, k: usize) -> usize {
    m + k + 1
}

/// Knot count for `interior` caller-supplied interior knots.
pub fn nest_explicit(interior: usize, k: usize) -> usize {
    interior + 2 * k + 2
}

/// Real workspace of `curfit`.
pub fn lwrk_curfit(m: usize, k: usize, nest: usize) -> usize {
    m * (k + 1) + nest * (7 + 3 * k)
}

/// Real workspace of `percur`.
pub fn lwrk_percur(m: usize, k: usize, nest: usize) -> usize {
    m * (k + 1) + nest * (8 + 5 * k)
}

/// Real workspace of `parcur` for `idim` dimensions.
pub fn lwrk_parcur(m: usize, k: usize, nest: usize, idim: usize) -> usize {
    m * (k + 1) + nest * (6 + idim + 3 * k)
}

/// Real workspace of `clocur` for `idim` dimensions.
pub fn lwrk_clocur(m: usize, k: usize, nest: usize, idim: usize) -> usize {
    m * (k + 1) + nest * (7 + idim + 5 * k)
}

/// Integer workspace of the four curve fitters.
pub fn kwrk_curve(nest: usize) -> usize {
    nest
}

/// Band widths `(b1, b2)` of the surface observation system with
/// `u x v` coefficients.
pub fn surfit_bands(u: usize, v: usize, kx: usize, ky: usize) -> (usize, usize) {
    let bx = kx * v + ky + 1;
    let by = ky * u + kx + 1;
    if bx <= by {
        (bx, bx + v - ky)
    } else {
        (by, by + u - kx)
    }
}

/// Primary real workspace (`lwrk1`) of `surfit`.
pub fn lwrk1_surfit(m: usize, kx: usize, ky: usize, nxest: usize, nyest: usize) -> usize {
    let u = nxest - kx - 1;
    let v = nyest - ky - 1;
    let km = kx.max(ky) + 1;
    let ne = nxest.max(nyest);
    let (b1, b2) = surfit_bands(u, v, kx, ky);
    u * v * (2 + b1 + b2) + 2 * (u + v + km * (m + ne) + ne - kx - ky) + b2 + 1
}

/// Secondary real workspace (`lwrk2`) of `surfit` for `nx x ny` knots.
///
/// Only used when the system is rank deficient. Sizing it for the minimal
/// knot set (`nx = 2kx+2`, `ny = 2ky+2`) and letting the routine report a
/// larger need keeps fresh fits cheap.
pub fn lwrk2_surfit(nx: usize, ny: usize, kx: usize, ky: usize) -> usize {
    let u = nx - kx - 1;
    let v = ny - ky - 1;
    let (_, b2) = surfit_bands(u, v, kx, ky);
    u * v * (b2 + 1) + b2
}

/// Integer workspace of `surfit`.
pub fn kwrk_surfit(m: usize, kx: usize, ky: usize, nxest: usize, nyest: usize) -> usize {
    m + (nxest - 2 * kx - 1) * (nyest - 2 * ky - 1)
}

/// Real workspace of `regrid`.
pub fn lwrk_regrid(mx: usize, my: usize, kx: usize, ky: usize, nxest: usize, nyest: usize) -> usize {
    4 + nxest * (my + 2 * kx + 5) + nyest * (2 * ky + 5) + mx * (kx + 1) + my * (ky + 1) + my.max(nxest)
}

/// Integer workspace of `regrid`.
pub fn kwrk_regrid(mx: usize, my: usize, nxest: usize, nyest: usize) -> usize {
    3 + mx + my + nxest + nyest
}

/// Real workspace of `bispev` on an `mx x my` grid.
pub fn lwrk_bispev(mx: usize, my: usize, kx: usize, ky: usize) -> usize {
    mx * (kx + 1) + my * (ky + 1)
}

/// Integer workspace of `bispev` and `parder`.
pub fn kwrk_grid_eval(mx: usize, my: usize) -> usize {
    mx + my
}

/// Real workspace of `parder` for orders `(nux, nuy)`.
#[allow(clippy::too_many_arguments)]
pub fn lwrk_parder(mx: usize, my: usize, kx: usize, ky: usize, nux: usize, nuy: usize, nx: usize, ny: usize) -> usize {
    mx * (kx + 1 - nux) + my * (ky + 1 - nuy) + (nx - kx - 1) * (ny - ky - 1)
}

/// Scratch for `splder` and `splint` on `n` knots.
pub fn scratch_curve(n: usize) -> usize {
    n
}

/// Scratch for `dblint`.
pub fn scratch_dblint(nx: usize, ny: usize, kx: usize, ky: usize) -> usize {
    nx + ny - kx - ky - 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knot_capacities() {
        assert_eq!(nest_curve(5, 3), 9);
        assert_eq!(nest_curve(3, 5), 13);
        assert_eq!(nest_periodic(9, 3), 15);
        assert_eq!(nest_periodic(2, 3), 9);
        // ceil(sqrt(50)) = 8
        assert_eq!(nest_scattered(100, 3), 12);
        assert_eq!(nest_scattered(4, 3), 9);
        assert_eq!(nest_grid(10, 3), 14);
        assert_eq!(nest_explicit(2, 3), 10);
    }

    #[test]
    fn test_curve_workspaces() {
        assert_eq!(lwrk_curfit(5, 3, 9), 20 + 9 * 16);
        assert_eq!(lwrk_percur(9, 3, 15), 36 + 15 * 23);
        assert_eq!(lwrk_parcur(10, 3, 14, 2), 40 + 14 * 17);
        assert_eq!(lwrk_clocur(10, 3, 16, 2), 40 + 16 * 24);
        assert_eq!(kwrk_curve(14), 14);
    }

    #[test]
    fn test_surfit_workspaces() {
        // kx = ky = 3, nxest = nyest = 12: u = v = 8, bx = by = 28.
        assert_eq!(surfit_bands(8, 8, 3, 3), (28, 33));
        // 64 * 63 + 2 * (16 + 4 * 112 + 12 - 6) + 34
        assert_eq!(lwrk1_surfit(100, 3, 3, 12, 12), 4032 + 940 + 34);
        assert_eq!(kwrk_surfit(100, 3, 3, 12, 12), 125);
        // Minimal linear patch: u = v = 2, b2 = 5.
        assert_eq!(lwrk2_surfit(4, 4, 1, 1), 29);
        // Unequal degrees take the narrower band.
        assert_eq!(surfit_bands(4, 6, 1, 3), (10, 13));
    }

    #[test]
    fn test_grid_workspaces() {
        assert_eq!(lwrk_regrid(6, 5, 3, 3, 10, 9), 4 + 10 * 16 + 9 * 11 + 24 + 20 + 10);
        assert_eq!(kwrk_regrid(6, 5, 10, 9), 33);
        assert_eq!(lwrk_bispev(1, 1, 3, 2), 7);
        assert_eq!(kwrk_grid_eval(3, 4), 7);
        assert_eq!(lwrk_parder(2, 3, 3, 3, 1, 0, 10, 9), 6 + 12 + 30);
        assert_eq!(scratch_dblint(10, 9, 3, 3), 11);
        assert_eq!(scratch_curve(9), 9);
    }
}
