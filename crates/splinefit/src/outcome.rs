//! Results that may carry a non-fatal diagnostic.

use std::fmt;

/// Kind of degradation reported alongside a usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// The smoothing condition `fp ~ s` could not be met.
    ToleranceUnmet,
    /// The smoothing iteration stopped at its cap.
    IterationLimit,
    /// The surface is a minimum-norm solution of a rank-deficient system.
    RankDeficient {
        /// Numerical rank.
        rank: usize,
        /// Coefficient count minus rank.
        deficiency: usize,
    },
    /// Only the first `limit` roots were returned.
    RootsTruncated {
        /// Number of roots returned.
        limit: usize,
    },
}

/// A non-fatal diagnostic from a routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitWarning {
    /// What went wrong.
    pub kind: WarningKind,
    /// Raw status code.
    pub code: i32,
    /// Diagnostic text.
    pub message: &'static str,
}

impl FitWarning {
    /// Creates a warning.
    pub fn new(kind: WarningKind, code: i32, message: &'static str) -> Self {
        Self { kind, code, message }
    }
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::RankDeficient { rank, deficiency } => {
                write!(f, "{} (status {}, rank {rank}, deficiency {deficiency})", self.message, self.code)
            }
            WarningKind::RootsTruncated { limit } => {
                write!(f, "{} (status {}, kept {limit})", self.message, self.code)
            }
            _ => write!(f, "{} (status {})", self.message, self.code),
        }
    }
}

/// A value paired with an optional warning.
///
/// The value is always usable; the warning says how it falls short of
/// what was requested.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Outcome<T> {
    value: T,
    warning: Option<FitWarning>,
}

impl<T> Outcome<T> {
    /// A clean result.
    pub fn new(value: T) -> Self {
        Self { value, warning: None }
    }

    /// A result with an optional warning.
    pub fn with_warning(value: T, warning: Option<FitWarning>) -> Self {
        Self { value, warning }
    }

    /// The value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The warning, if any.
    pub fn warning(&self) -> Option<&FitWarning> {
        self.warning.as_ref()
    }

    /// Returns true if no warning was raised.
    pub fn is_clean(&self) -> bool {
        self.warning.is_none()
    }

    /// Splits into value and warning.
    pub fn into_parts(self) -> (T, Option<FitWarning>) {
        (self.value, self.warning)
    }

    /// Drops the warning.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the value, keeping the warning.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warning: self.warning,
        }
    }
}
