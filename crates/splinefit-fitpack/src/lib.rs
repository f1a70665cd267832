//! # Splinefit FITPACK
//!
//! Smoothing B-spline routines over flat numeric buffers.
//!
//! Every routine takes caller-owned slices, checks them against a
//! documented minimum length, and returns an integer status code instead of
//! a `Result`. No routine keeps state between calls: anything a
//! continuation call needs is left in the caller's buffers.
//!
//! - **Curve fitting**: [`curfit`], [`percur`], [`parcur`], [`clocur`]
//! - **Surface fitting**: [`surfit`] (scattered data), [`regrid`] (grids)
//! - **Evaluation**: [`splev`], [`splder`], [`splint`], [`sproot`],
//!   [`bispev`], [`parder`], [`dblint`]
//!
//! ## Status codes
//!
//! | code | meaning |
//! |---|---|
//! | 0 | normal return, `fp` within tolerance of `s` |
//! | -1 | interpolating spline (`fp = 0`) |
//! | -2 | weighted least-squares polynomial (`fp <= s`) |
//! | < -2 | `surfit` only: rank-deficient solution, rank = `-code` |
//! | 1 | knot capacity (`nest`) too small |
//! | 2 | smoothing iteration lost its bracket; `s` probably too small |
//! | 3 | smoothing iteration cap (20) reached |
//! | 4 | `surfit`: more coefficients than data points |
//! | 5 | `surfit`: no data point left to place a knot |
//! | 10 | invalid input |
//! | > 10 | `surfit`: required length of `wrk2` |
//!
//! ## Surface band widths
//!
//! With `u = nxest-kx-1` and `v = nyest-ky-1`, `bx = kx*v+ky+1` and
//! `by = ky*u+kx+1`. Then `b1 = min(bx, by)` and `b2 = b1+v-ky` when
//! `bx <= by`, otherwise `b2 = b1+u-kx`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::unreadable_literal)]

mod bspline;
mod curve;
mod grid;
mod knots;
mod lsq;
mod roots;
mod surface;

pub use bspline::{find_interval, fpbspl, fpchec, splder, splev, splint};
pub use curve::{clocur, curfit, parcur, percur, MAX_IDIM};
pub use grid::regrid;
pub use roots::sproot;
pub use surface::{bispev, dblint, parder, surfit};
