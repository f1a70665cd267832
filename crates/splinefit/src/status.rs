//! Translation of routine status codes.
//!
//! Each routine family reports an integer status. The codes overlap between
//! families (a `1` means "knot capacity too small" from a fitter but
//! "out of domain" from `splev`), so decoding always starts from the
//! [`Routine`] that produced the code.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{SplineError, SplineResult};
use crate::outcome::{FitWarning, WarningKind};

/// The numerical routines called by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Routine {
    /// Open 1-D smoothing curve.
    Curfit,
    /// Periodic 1-D smoothing curve.
    Percur,
    /// Open parametric curve.
    Parcur,
    /// Closed parametric curve.
    Clocur,
    /// Surface from scattered data.
    Surfit,
    /// Surface from gridded data.
    Regrid,
    /// Curve evaluation.
    Splev,
    /// Curve derivative.
    Splder,
    /// Curve integral.
    Splint,
    /// Cubic curve roots.
    Sproot,
    /// Surface evaluation.
    Bispev,
    /// Surface partial derivative.
    Parder,
    /// Surface double integral.
    Dblint,
}

impl Routine {
    /// Lowercase routine name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Curfit => "curfit",
            Self::Percur => "percur",
            Self::Parcur => "parcur",
            Self::Clocur => "clocur",
            Self::Surfit => "surfit",
            Self::Regrid => "regrid",
            Self::Splev => "splev",
            Self::Splder => "splder",
            Self::Splint => "splint",
            Self::Sproot => "sproot",
            Self::Bispev => "bispev",
            Self::Parder => "parder",
            Self::Dblint => "dblint",
        }
    }

    /// Returns true for the routines that construct a spline.
    pub fn is_fit(self) -> bool {
        matches!(
            self,
            Self::Curfit | Self::Percur | Self::Parcur | Self::Clocur | Self::Surfit | Self::Regrid
        )
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a status affects the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The result is exactly what was asked for.
    Success,
    /// The result is usable but degraded.
    Warning,
    /// No usable result.
    Fatal,
}

/// A decoded routine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// `fp` is within tolerance of the smoothing factor.
    Normal,
    /// The spline interpolates the data.
    Interpolating,
    /// The spline is a weighted least-squares polynomial.
    Polynomial,
    /// Minimum-norm solution of a rank-deficient system.
    RankDeficient {
        /// Numerical rank of the observation matrix.
        rank: usize,
    },
    /// The knot capacity was exhausted before the tolerance was met.
    NestTooSmall,
    /// The smoothing iteration lost its bracket; `s` is probably too small.
    ToleranceUnmet,
    /// The smoothing iteration hit its cap of 20 iterations.
    IterationLimit,
    /// More coefficients than data points.
    TooManyCoefficients,
    /// No data point left to place a new knot.
    KnotPlacement,
    /// The routine rejected its arguments.
    InvalidInput,
    /// The secondary workspace must grow to `required` values.
    StorageExceeded {
        /// Required workspace length.
        required: usize,
    },
    /// An evaluation point lies outside the domain.
    OutOfDomain,
    /// More roots exist than the output buffer holds.
    RootsTruncated,
    /// A code not documented for the routine.
    Unknown(i32),
}

impl Status {
    /// Decodes `code` as reported by `routine`.
    pub fn from_code(routine: Routine, code: i32) -> Self {
        use Routine as R;
        match (routine, code) {
            (_, 0) => Self::Normal,
            (_, 10) => Self::InvalidInput,
            (R::Surfit, c) if c < -2 => Self::RankDeficient { rank: c.unsigned_abs() as usize },
            (R::Surfit, c) if c > 10 => Self::StorageExceeded { required: c as usize },
            (R::Surfit, 4) => Self::TooManyCoefficients,
            (R::Surfit, 5) => Self::KnotPlacement,
            (r, c) if r.is_fit() => match c {
                -1 => Self::Interpolating,
                -2 => Self::Polynomial,
                1 => Self::NestTooSmall,
                2 => Self::ToleranceUnmet,
                3 => Self::IterationLimit,
                other => Self::Unknown(other),
            },
            (R::Splev | R::Splder, 1) => Self::OutOfDomain,
            (R::Sproot, 1) => Self::RootsTruncated,
            (_, other) => Self::Unknown(other),
        }
    }

    /// The raw code, where one is fixed.
    pub fn code(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::Interpolating => -1,
            Self::Polynomial => -2,
            Self::RankDeficient { rank } => -(rank as i32),
            Self::NestTooSmall | Self::OutOfDomain | Self::RootsTruncated => 1,
            Self::ToleranceUnmet => 2,
            Self::IterationLimit => 3,
            Self::TooManyCoefficients => 4,
            Self::KnotPlacement => 5,
            Self::InvalidInput => 10,
            Self::StorageExceeded { required } => required as i32,
            Self::Unknown(code) => code,
        }
    }

    /// Severity of the status.
    ///
    /// `StorageExceeded` is fatal here: the surface fitter handles it
    /// before translation, so seeing it means the retry did not help.
    pub fn severity(self) -> Severity {
        match self {
            Self::Normal | Self::Interpolating | Self::Polynomial => Severity::Success,
            Self::RankDeficient { .. } | Self::ToleranceUnmet | Self::IterationLimit | Self::RootsTruncated => {
                Severity::Warning
            }
            Self::NestTooSmall
            | Self::TooManyCoefficients
            | Self::KnotPlacement
            | Self::InvalidInput
            | Self::StorageExceeded { .. }
            | Self::OutOfDomain
            | Self::Unknown(_) => Severity::Fatal,
        }
    }

    /// Diagnostic text for the status.
    pub fn message(self) -> &'static str {
        match self {
            Self::Normal => "the spline meets the smoothing condition",
            Self::Interpolating => "the spline interpolates the data",
            Self::Polynomial => "the spline is a weighted least-squares polynomial",
            Self::RankDeficient { .. } => {
                "the observation system is rank deficient; the spline is a minimum-norm solution"
            }
            Self::NestTooSmall => "knot capacity exhausted; s is probably too small",
            Self::ToleranceUnmet => "the smoothing iteration lost its bracket; s is probably too small",
            Self::IterationLimit => "the smoothing iteration reached its limit of 20 iterations",
            Self::TooManyCoefficients => "more coefficients than data points; s is too small or the degrees too high",
            Self::KnotPlacement => "no data point left to place a new knot; s is too small",
            Self::InvalidInput => "invalid input",
            Self::StorageExceeded { .. } => "the secondary workspace is too small",
            Self::OutOfDomain => "a point lies outside the spline domain",
            Self::RootsTruncated => "more roots exist than were requested",
            Self::Unknown(_) => "undocumented status",
        }
    }
}

/// Turns a routine status into a warning or an error.
///
/// `extent` is the coefficient count for fits (used for the rank
/// deficiency) and the root capacity for `sproot`.
pub(crate) fn translate(routine: Routine, code: i32, extent: usize) -> SplineResult<Option<FitWarning>> {
    let status = Status::from_code(routine, code);
    match status.severity() {
        Severity::Success => Ok(None),
        Severity::Warning => {
            let kind = match status {
                Status::RankDeficient { rank } => WarningKind::RankDeficient {
                    rank,
                    deficiency: extent.saturating_sub(rank),
                },
                Status::IterationLimit => WarningKind::IterationLimit,
                Status::RootsTruncated => WarningKind::RootsTruncated { limit: extent },
                _ => WarningKind::ToleranceUnmet,
            };
            let warning = FitWarning::new(kind, code, status.message());
            warn!("{routine}: {warning}");
            Ok(Some(warning))
        }
        Severity::Fatal => {
            let message = status.message();
            if routine.is_fit() {
                Err(SplineError::FitFailed { routine, code, message })
            } else {
                Err(SplineError::Evaluation { routine, code, message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FITTERS: [Routine; 6] = [
        Routine::Curfit,
        Routine::Percur,
        Routine::Parcur,
        Routine::Clocur,
        Routine::Surfit,
        Routine::Regrid,
    ];

    #[test]
    fn test_documented_fit_codes() {
        for routine in FITTERS {
            assert_eq!(Status::from_code(routine, 0), Status::Normal);
            assert_eq!(Status::from_code(routine, -1), Status::Interpolating);
            assert_eq!(Status::from_code(routine, -2), Status::Polynomial);
            assert_eq!(Status::from_code(routine, 1), Status::NestTooSmall);
            assert_eq!(Status::from_code(routine, 2), Status::ToleranceUnmet);
            assert_eq!(Status::from_code(routine, 3), Status::IterationLimit);
            assert_eq!(Status::from_code(routine, 10), Status::InvalidInput);
        }
    }

    #[test]
    fn test_surfit_only_codes() {
        assert_eq!(Status::from_code(Routine::Surfit, -7), Status::RankDeficient { rank: 7 });
        assert_eq!(Status::from_code(Routine::Surfit, 4), Status::TooManyCoefficients);
        assert_eq!(Status::from_code(Routine::Surfit, 5), Status::KnotPlacement);
        assert_eq!(
            Status::from_code(Routine::Surfit, 418),
            Status::StorageExceeded { required: 418 }
        );
        assert_eq!(Status::from_code(Routine::Curfit, -7), Status::Unknown(-7));
        assert_eq!(Status::from_code(Routine::Regrid, 4), Status::Unknown(4));
        assert_eq!(Status::from_code(Routine::Curfit, 418), Status::Unknown(418));
    }

    #[test]
    fn test_evaluation_codes() {
        assert_eq!(Status::from_code(Routine::Splev, 1), Status::OutOfDomain);
        assert_eq!(Status::from_code(Routine::Splder, 1), Status::OutOfDomain);
        assert_eq!(Status::from_code(Routine::Sproot, 1), Status::RootsTruncated);
        assert_eq!(Status::from_code(Routine::Bispev, 10), Status::InvalidInput);
        assert_eq!(Status::from_code(Routine::Parder, 1), Status::Unknown(1));
    }

    #[test]
    fn test_codes_round_trip_through_status() {
        for code in [-9, -2, -1, 0, 1, 2, 3, 4, 5, 10, 55] {
            assert_eq!(Status::from_code(Routine::Surfit, code).code(), code);
        }
    }

    #[test]
    fn test_severity_classes() {
        assert_eq!(Status::Interpolating.severity(), Severity::Success);
        assert_eq!(Status::ToleranceUnmet.severity(), Severity::Warning);
        assert_eq!(Status::IterationLimit.severity(), Severity::Warning);
        assert_eq!(Status::RankDeficient { rank: 3 }.severity(), Severity::Warning);
        assert_eq!(Status::NestTooSmall.severity(), Severity::Fatal);
        assert_eq!(Status::StorageExceeded { required: 20 }.severity(), Severity::Fatal);
        assert_eq!(Status::Unknown(7).severity(), Severity::Fatal);
    }

    #[test]
    fn test_translate() {
        assert_eq!(translate(Routine::Curfit, -1, 8), Ok(None));

        let warning = translate(Routine::Curfit, 3, 8).unwrap().unwrap();
        assert_eq!(warning.kind, WarningKind::IterationLimit);
        assert_eq!(warning.code, 3);

        let warning = translate(Routine::Surfit, -5, 9).unwrap().unwrap();
        assert_eq!(warning.kind, WarningKind::RankDeficient { rank: 5, deficiency: 4 });

        match translate(Routine::Percur, 1, 8) {
            Err(SplineError::FitFailed { routine, code, .. }) => {
                assert_eq!(routine, Routine::Percur);
                assert_eq!(code, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            translate(Routine::Bispev, 10, 0),
            Err(SplineError::Evaluation { routine: Routine::Bispev, .. })
        ));
    }
}
