//! Kinetic parameters and their validated limits.
//!
//! [`Limits`] is the single immutable table of ranges and defaults for
//! every configurable value. It is built once (usually via
//! [`Limits::default`]) and embedded in each vessel; every write to a
//! parameter or dimension is checked against it and rejected, never
//! clamped, when out of range.

use std::fmt;

use crate::error::ValidationError;

/// Lower clamp applied to every computed concentration.
pub const MIN_CONCENTRATION: f64 = 0.001;

/// Concentrations `(A, B, C)` used to fill a freshly allocated grid and
/// by the `Uniform` boundary policy.
pub const INITIAL_CONCENTRATIONS: [f64; 3] = [0.0, 0.4, 0.9];

// ── Parameter ────────────────────────────────────────────────────

/// Names every validated configuration value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Total concentration `b`.
    B,
    /// Rate constant `K1`.
    K1,
    /// Feedback strength `W1` (from species C).
    W1,
    /// Rate constant `K2`.
    K2,
    /// Feedback strength `W2` (from species B).
    W2,
    /// Grid width in cells.
    Width,
    /// Grid height in cells.
    Height,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::B => "b",
            Self::K1 => "K1",
            Self::W1 => "W1",
            Self::K2 => "K2",
            Self::W2 => "W2",
            Self::Width => "width",
            Self::Height => "height",
        };
        f.write_str(name)
    }
}

/// One of the five kinetic coefficients.
///
/// A subset of [`Parameter`] that excludes the grid dimensions, so
/// coefficient lookups cannot be handed a width or height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coefficient {
    /// Total concentration `b`.
    B,
    /// Rate constant `K1`.
    K1,
    /// Feedback strength `W1`.
    W1,
    /// Rate constant `K2`.
    K2,
    /// Feedback strength `W2`.
    W2,
}

impl Coefficient {
    /// Every coefficient, in validation order.
    pub const ALL: [Coefficient; 5] = [Self::B, Self::K1, Self::W1, Self::K2, Self::W2];
}

impl From<Coefficient> for Parameter {
    fn from(c: Coefficient) -> Self {
        match c {
            Coefficient::B => Self::B,
            Coefficient::K1 => Self::K1,
            Coefficient::W1 => Self::W1,
            Coefficient::K2 => Self::K2,
            Coefficient::W2 => Self::W2,
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Parameter::from(*self), f)
    }
}

/// One of the two grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Grid width in cells.
    Width,
    /// Grid height in cells.
    Height,
}

impl From<Dimension> for Parameter {
    fn from(d: Dimension) -> Self {
        match d {
            Dimension::Width => Self::Width,
            Dimension::Height => Self::Height,
        }
    }
}

// ── Range ────────────────────────────────────────────────────────

/// Inclusive range plus default for one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range<T> {
    /// Smallest accepted value.
    pub min: T,
    /// Largest accepted value.
    pub max: T,
    /// Value used when none is configured.
    pub default: T,
}

impl<T: Copy + PartialOrd + Into<f64>> Range<T> {
    /// Create a range.
    pub const fn new(min: T, max: T, default: T) -> Self {
        Self { min, max, default }
    }

    /// Whether `value` lies within `[min, max]`.
    ///
    /// NaN is never contained.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check `value`, naming `parameter` in the error.
    pub fn check(&self, parameter: Parameter, value: T) -> Result<T, ValidationError> {
        if self.contains(value) && Into::<f64>::into(value).is_finite() {
            Ok(value)
        } else {
            Err(ValidationError::OutOfRange {
                parameter,
                value: value.into(),
                min: self.min.into(),
                max: self.max.into(),
            })
        }
    }

    fn validate(&self, parameter: Parameter) -> Result<(), ValidationError> {
        let (min, max, default): (f64, f64, f64) =
            (self.min.into(), self.max.into(), self.default.into());
        if !min.is_finite() || !max.is_finite() || !default.is_finite() {
            return Err(ValidationError::InvalidLimits {
                parameter,
                reason: "bounds and default must be finite".to_string(),
            });
        }
        if min > max {
            return Err(ValidationError::InvalidLimits {
                parameter,
                reason: format!("min ({min}) exceeds max ({max})"),
            });
        }
        if default < min || default > max {
            return Err(ValidationError::InvalidLimits {
                parameter,
                reason: format!("default ({default}) is outside [{min}, {max}]"),
            });
        }
        Ok(())
    }
}

// ── Limits ───────────────────────────────────────────────────────

/// Ranges and defaults for every configurable value.
///
/// | Parameter | Min  | Max   | Default |
/// |-----------|------|-------|---------|
/// | b         | 0.1  | 2.0   | 1.0     |
/// | K1        | 0.1  | 100.0 | 5.1     |
/// | W1        | 0.01 | 10.0  | 0.45    |
/// | K2        | 0.1  | 100.0 | 5.5     |
/// | W2        | 0.1  | 100.0 | 6.5     |
/// | width     | 3    | 1000  | 200     |
/// | height    | 3    | 1000  | 200     |
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    /// Range of `b`.
    pub b: Range<f64>,
    /// Range of `K1`.
    pub k1: Range<f64>,
    /// Range of `W1`.
    pub w1: Range<f64>,
    /// Range of `K2`.
    pub k2: Range<f64>,
    /// Range of `W2`.
    pub w2: Range<f64>,
    /// Range of the grid width.
    pub width: Range<u32>,
    /// Range of the grid height.
    pub height: Range<u32>,
}

impl Limits {
    /// The Gontar model's standard limits.
    pub const GONTAR: Limits = Limits {
        b: Range::new(0.1, 2.0, 1.0),
        k1: Range::new(0.1, 100.0, 5.1),
        w1: Range::new(0.01, 10.0, 0.45),
        k2: Range::new(0.1, 100.0, 5.5),
        w2: Range::new(0.1, 100.0, 6.5),
        width: Range::new(3, 1000, 200),
        height: Range::new(3, 1000, 200),
    };

    /// Check that every range is well formed and that no dimension
    /// minimum is below 3 (a grid needs at least one interior cell).
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.b.validate(Parameter::B)?;
        self.k1.validate(Parameter::K1)?;
        self.w1.validate(Parameter::W1)?;
        self.k2.validate(Parameter::K2)?;
        self.w2.validate(Parameter::W2)?;
        self.width.validate(Parameter::Width)?;
        self.height.validate(Parameter::Height)?;
        for (parameter, range) in [
            (Parameter::Width, &self.width),
            (Parameter::Height, &self.height),
        ] {
            if range.min < 3 {
                return Err(ValidationError::InvalidLimits {
                    parameter,
                    reason: format!("minimum {} leaves no interior cells", range.min),
                });
            }
        }
        // Zero or negative b/W1 would make the kinetics degenerate everywhere.
        for (parameter, range) in [(Parameter::B, &self.b), (Parameter::W1, &self.w1)] {
            if range.min <= 0.0 {
                return Err(ValidationError::InvalidLimits {
                    parameter,
                    reason: format!("minimum {} must be positive", range.min),
                });
            }
        }
        Ok(())
    }

    /// Check a kinetic coefficient value.
    pub fn check(&self, coefficient: Coefficient, value: f64) -> Result<f64, ValidationError> {
        let range = match coefficient {
            Coefficient::B => &self.b,
            Coefficient::K1 => &self.k1,
            Coefficient::W1 => &self.w1,
            Coefficient::K2 => &self.k2,
            Coefficient::W2 => &self.w2,
        };
        range.check(coefficient.into(), value)
    }

    /// Check a grid dimension. Values that do not fit in `u32` are
    /// reported as out of range.
    pub fn check_dimension(
        &self,
        dimension: Dimension,
        value: usize,
    ) -> Result<usize, ValidationError> {
        let range = match dimension {
            Dimension::Width => &self.width,
            Dimension::Height => &self.height,
        };
        let parameter = Parameter::from(dimension);
        match u32::try_from(value) {
            Ok(v) => range.check(parameter, v).map(|v| v as usize),
            Err(_) => Err(ValidationError::OutOfRange {
                parameter,
                value: value as f64,
                min: range.min.into(),
                max: range.max.into(),
            }),
        }
    }

    /// Check both dimensions, width first.
    pub fn check_dimensions(
        &self,
        width: usize,
        height: usize,
    ) -> Result<(usize, usize), ValidationError> {
        Ok((
            self.check_dimension(Dimension::Width, width)?,
            self.check_dimension(Dimension::Height, height)?,
        ))
    }

    /// The default kinetic parameters under these limits.
    pub fn default_params(&self) -> KineticParams {
        KineticParams {
            b: self.b.default,
            k1: self.k1.default,
            w1: self.w1.default,
            k2: self.k2.default,
            w2: self.w2.default,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::GONTAR
    }
}

// ── KineticParams ────────────────────────────────────────────────

/// The five coefficients of the Gontar kinetic model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KineticParams {
    /// Total concentration; the upper clamp for every species.
    pub b: f64,
    /// Rate constant of the C-feedback branch.
    pub k1: f64,
    /// Feedback strength from species C.
    pub w1: f64,
    /// Rate constant of the B-feedback branch.
    pub k2: f64,
    /// Feedback strength from species B.
    pub w2: f64,
}

impl KineticParams {
    /// Validate every coefficient, reporting the first one out of range
    /// in `b, K1, W1, K2, W2` order.
    pub fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        for coefficient in Coefficient::ALL {
            limits.check(coefficient, self.get(coefficient))?;
        }
        Ok(())
    }

    /// Read one coefficient.
    pub fn get(&self, coefficient: Coefficient) -> f64 {
        match coefficient {
            Coefficient::B => self.b,
            Coefficient::K1 => self.k1,
            Coefficient::W1 => self.w1,
            Coefficient::K2 => self.k2,
            Coefficient::W2 => self.w2,
        }
    }

    /// Return a copy with one coefficient replaced (unvalidated).
    pub fn with(mut self, coefficient: Coefficient, value: f64) -> Self {
        match coefficient {
            Coefficient::B => self.b = value,
            Coefficient::K1 => self.k1 = value,
            Coefficient::W1 => self.w1 = value,
            Coefficient::K2 => self.k2 = value,
            Coefficient::W2 => self.w2 = value,
        }
        self
    }
}

impl Default for KineticParams {
    fn default() -> Self {
        Limits::GONTAR.default_params()
    }
}
