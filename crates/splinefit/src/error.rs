//! Error types for spline construction and evaluation.

use thiserror::Error;

use crate::status::Routine;

/// A specialized Result type for spline operations.
pub type SplineResult<T> = Result<T, SplineError>;

/// Errors that can occur while fitting or using a spline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    /// Malformed input, rejected before any fitting routine runs.
    #[error("Validation error in {field}: {message}")]
    Validation {
        /// Input that failed validation.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The fitting routine reported a status that yields no spline.
    #[error("{routine} failed with status {code}: {message}")]
    FitFailed {
        /// Routine that failed.
        routine: Routine,
        /// Raw status code.
        code: i32,
        /// Diagnostic text for the status.
        message: &'static str,
    },

    /// A query point lies outside the spline domain.
    #[error("Point {x} is outside the domain [{min}, {max}]")]
    OutOfDomain {
        /// The query point.
        x: f64,
        /// Lower end of the domain.
        min: f64,
        /// Upper end of the domain.
        max: f64,
    },

    /// A derivative order outside the supported range.
    #[error("Derivative order {order} is outside [{min}, {max}]")]
    DerivativeOrder {
        /// Requested order.
        order: usize,
        /// Smallest supported order.
        min: usize,
        /// Largest supported order.
        max: usize,
    },

    /// Root finding was requested on a spline that is not cubic.
    #[error("Root finding requires a cubic spline, got degree {degree}")]
    RootsRequireCubic {
        /// Degree of the spline.
        degree: usize,
    },

    /// An evaluation routine rejected its input.
    #[error("{routine} rejected the evaluation with status {code}: {message}")]
    Evaluation {
        /// Routine that rejected the call.
        routine: Routine,
        /// Raw status code.
        code: i32,
        /// Diagnostic text for the status.
        message: &'static str,
    },
}

impl SplineError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an out-of-domain error.
    #[must_use]
    pub fn out_of_domain(x: f64, min: f64, max: f64) -> Self {
        Self::OutOfDomain { x, min, max }
    }

    /// Creates a derivative order error.
    #[must_use]
    pub fn derivative_order(order: usize, min: usize, max: usize) -> Self {
        Self::DerivativeOrder { order, min, max }
    }

    /// Returns true for errors raised before any routine was called.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// A single failed configuration check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl From<ValidationError> for SplineError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Returns every failed check, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and folds all failures into a single error.
    fn validate_or_error(&self) -> SplineResult<()> {
        let mut errors = self.validate();
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0).into()),
            _ => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Err(SplineError::validation(fields.join(", "), messages.join("; ")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Checks(Vec<ValidationError>);

    impl Validate for Checks {
        fn validate(&self) -> Vec<ValidationError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_error_display() {
        let err = SplineError::out_of_domain(5.0, 0.0, 4.0);
        assert_eq!(err.to_string(), "Point 5 is outside the domain [0, 4]");

        let err = SplineError::FitFailed {
            routine: Routine::Curfit,
            code: 10,
            message: "invalid input",
        };
        assert_eq!(err.to_string(), "curfit failed with status 10: invalid input");
    }

    #[test]
    fn test_validate_or_error_folds_messages() {
        assert!(Checks(vec![]).validate_or_error().is_ok());

        let single = Checks(vec![ValidationError::new("degree", "must be in [1, 5]")]);
        assert_eq!(
            single.validate_or_error(),
            Err(SplineError::validation("degree", "must be in [1, 5]"))
        );

        let many = Checks(vec![
            ValidationError::new("degree", "bad"),
            ValidationError::new("smoothing", "negative"),
        ]);
        match many.validate_or_error() {
            Err(SplineError::Validation { field, message }) => {
                assert_eq!(field, "degree, smoothing");
                assert_eq!(message, "degree: bad; smoothing: negative");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
