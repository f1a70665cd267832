//! # Splinefit
//!
//! Smoothing B-spline curves, parametric curves and surfaces.
//!
//! This crate provides:
//!
//! - **Curves**: [`Spline1D`], fitted by interpolation, smoothing or a
//!   fixed-knot least-squares fit, optionally periodic
//! - **Parametric curves**: [`ParametricSpline`], open or closed, in up to
//!   ten dimensions
//! - **Surfaces**: [`Spline2D`], from scattered points or a grid
//! - **Status handling**: every routine status becomes a value, a
//!   [`FitWarning`] carried in an [`Outcome`], or a [`SplineError`]
//!
//! The numerical work is done by `splinefit-fitpack`; this crate sizes its
//! buffers, picks the routine, and decodes what comes back.
//!
//! ## Example
//!
//! ```rust
//! use splinefit::prelude::*;
//!
//! let x: Vec<f64> = (0..20).map(|i| f64::from(i) * 0.3).collect();
//! let y: Vec<f64> = x.iter().map(|v| v.sin()).collect();
//!
//! let config = CurveConfig::new().with_smoothing(0.01);
//! let outcome = Spline1D::fit(&x, &y, &config).unwrap();
//! if let Some(warning) = outcome.warning() {
//!     eprintln!("degraded fit: {warning}");
//! }
//! let spline = outcome.into_value();
//! let slope = spline.derivative_at(1.0, 1).unwrap();
//! assert!((slope - 1.0_f64.cos()).abs() < 0.2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::float_cmp)]

pub mod config;
pub mod curve;
pub mod error;
pub mod extrapolation;
pub mod outcome;
pub mod parametric;
pub mod scratch;
pub mod sizing;
pub mod status;
pub mod surface;

mod validation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{Bounds, CurveConfig, GridConfig, ParametricConfig, SurfaceConfig};
    pub use crate::curve::Spline1D;
    pub use crate::error::{SplineError, SplineResult, Validate};
    pub use crate::extrapolation::Extrapolation;
    pub use crate::outcome::{FitWarning, Outcome, WarningKind};
    pub use crate::parametric::ParametricSpline;
    pub use crate::scratch::Scratch;
    pub use crate::surface::Spline2D;
}

pub use config::{Bounds, CurveConfig, GridConfig, ParametricConfig, SurfaceConfig};
pub use curve::Spline1D;
pub use error::{SplineError, SplineResult, Validate, ValidationError};
pub use extrapolation::Extrapolation;
pub use outcome::{FitWarning, Outcome, WarningKind};
pub use parametric::ParametricSpline;
pub use scratch::Scratch;
pub use status::{Routine, Severity, Status};
pub use surface::Spline2D;
