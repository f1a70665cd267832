//! Boundary policy for evaluation outside the spline domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SplineError;

/// What a curve returns for points outside `[t[k], t[n-k-1]]`.
///
/// The discriminants are the codes understood by the evaluation routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Continue the polynomial piece at the nearest boundary.
    #[default]
    Extrapolate,
    /// Return zero.
    Zero,
    /// Fail with an out-of-domain error.
    Error,
    /// Clamp the point to the nearest boundary first.
    Nearest,
}

impl Extrapolation {
    /// All modes, in code order.
    pub const ALL: [Extrapolation; 4] = [Self::Extrapolate, Self::Zero, Self::Error, Self::Nearest];

    /// Code passed to the evaluation routines.
    pub fn code(self) -> i32 {
        match self {
            Self::Extrapolate => 0,
            Self::Zero => 1,
            Self::Error => 2,
            Self::Nearest => 3,
        }
    }

    /// Mode for a routine code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Extrapolate => "extrapolate",
            Self::Zero => "zero",
            Self::Error => "error",
            Self::Nearest => "nearest",
        }
    }
}

impl fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extrapolation {
    type Err = SplineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| {
                SplineError::validation(
                    "boundary",
                    format!("unknown mode '{s}', expected one of extrapolate, zero, error, nearest"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for mode in Extrapolation::ALL {
            assert_eq!(Extrapolation::from_code(mode.code()), Some(mode));
        }
        assert_eq!(Extrapolation::from_code(4), None);
        assert_eq!(Extrapolation::from_code(-1), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Nearest".parse::<Extrapolation>(), Ok(Extrapolation::Nearest));
        assert_eq!(" zero ".parse::<Extrapolation>(), Ok(Extrapolation::Zero));
        assert!("clamp".parse::<Extrapolation>().is_err());
        assert_eq!(Extrapolation::Error.to_string(), "error");
        assert_eq!(Extrapolation::default(), Extrapolation::Extrapolate);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Extrapolation::Nearest).unwrap();
        assert_eq!(json, "\"nearest\"");
        let back: Extrapolation = serde_json::from_str("\"zero\"").unwrap();
        assert_eq!(back, Extrapolation::Zero);
    }
}
