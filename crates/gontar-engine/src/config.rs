//! Vessel and run-loop configuration.
//!
//! [`VesselConfig`] is the builder-input for [`Vessel::new`](crate::Vessel::new);
//! [`validate()`](VesselConfig::validate) checks every value against the
//! embedded [`Limits`] and reports the first violation. [`RunConfig`]
//! controls the background step loop of a [`Simulation`](crate::Simulation).

use gontar_core::{BoundaryCondition, KineticParams, Limits, ValidationError};

use crate::realtime::RunError;

// ── VesselConfig ─────────────────────────────────────────────────

/// Complete configuration for constructing a [`Vessel`](crate::Vessel).
#[derive(Clone, Debug, PartialEq)]
pub struct VesselConfig {
    /// Grid width in cells. Default: 200.
    pub width: usize,
    /// Grid height in cells. Default: 200.
    pub height: usize,
    /// Kinetic coefficients. Default: the limits' defaults.
    pub params: KineticParams,
    /// Initial boundary policy. Default: [`BoundaryCondition::Uniform`].
    pub boundary: BoundaryCondition,
    /// Ranges every value is validated against, for the vessel's lifetime.
    pub limits: Limits,
}

impl VesselConfig {
    /// A default configuration with the given dimensions.
    pub fn with_dims(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Validate all values.
    ///
    /// Checks, in order: the limits table itself, width, height, then the
    /// coefficients `b, K1, W1, K2, W2`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.limits.validate()?;
        self.limits.check_dimensions(self.width, self.height)?;
        self.params.validate(&self.limits)
    }
}

impl Default for VesselConfig {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            width: limits.width.default as usize,
            height: limits.height.default as usize,
            params: limits.default_params(),
            boundary: BoundaryCondition::default(),
            limits,
        }
    }
}

// ── RunConfig ────────────────────────────────────────────────────

/// Configuration for the background step loop.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Upper bound on the step rate. `None` (the default) steps in a
    /// tight loop; `Some(hz)` sleeps out the rest of each `1/hz` budget.
    pub max_steps_per_second: Option<f64>,
    /// Name given to the computation thread. Default: `"gontar-vessel"`.
    pub thread_name: String,
}

impl RunConfig {
    /// Check that the step rate, if set, is finite and positive and that
    /// its reciprocal is finite.
    pub fn validate(&self) -> Result<(), RunError> {
        if let Some(hz) = self.max_steps_per_second {
            if !hz.is_finite() || hz <= 0.0 || !(1.0 / hz).is_finite() {
                return Err(RunError::InvalidStepRate { value: hz });
            }
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps_per_second: None,
            thread_name: "gontar-vessel".to_string(),
        }
    }
}
