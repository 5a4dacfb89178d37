//! Error types for the Gontar engine.
//!
//! Configuration problems are the only errors surfaced to callers.
//! Numeric singularities inside the kinetics are contained per cell and
//! reported as outcomes, not errors (see `gontar-kinetics`).

use std::error::Error;
use std::fmt;

use crate::params::Parameter;

/// A configuration value fell outside its allowed range.
///
/// Returned synchronously by construction, resize, and parameter setters.
/// The operation that produced it leaves all existing state untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// A value is outside `[min, max]`, or is not finite.
    OutOfRange {
        /// The offending parameter.
        parameter: Parameter,
        /// The rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// A limits table is itself inconsistent.
    InvalidLimits {
        /// The parameter whose range is malformed.
        parameter: Parameter,
        /// Description of the inconsistency.
        reason: String,
    },
}

impl ValidationError {
    /// The parameter this error refers to.
    pub fn parameter(&self) -> Parameter {
        match self {
            Self::OutOfRange { parameter, .. } | Self::InvalidLimits { parameter, .. } => {
                *parameter
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                parameter,
                value,
                min,
                max,
            } => write!(
                f,
                "{parameter} = {value} is outside the allowed range [{min}, {max}]"
            ),
            Self::InvalidLimits { parameter, reason } => {
                write!(f, "invalid limits for {parameter}: {reason}")
            }
        }
    }
}

impl Error for ValidationError {}

/// A boundary-condition name could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseBoundaryError {
    /// The unrecognised input.
    pub input: String,
}

impl fmt::Display for ParseBoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown boundary condition '{}'", self.input)
    }
}

impl Error for ParseBoundaryError {}
