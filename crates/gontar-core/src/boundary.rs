//! The boundary-condition selector.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseBoundaryError;

/// Policy governing the values held by the grid's outer ring.
///
/// The ring is exempt from kinetics; it is only ever written when a policy
/// is applied (at construction, on resize, and when the selection changes)
/// or by an injection that overlaps it.
///
/// `XRamp`, `YRamp`, and `None` are selectable but leave the ring untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundaryCondition {
    /// Ring keeps whatever values it already holds.
    None,
    /// Ring is set to the initial uniform concentrations.
    #[default]
    Uniform,
    /// `A` rises linearly with the row index.
    XGradient,
    /// `A` rises linearly with the column index.
    YGradient,
    /// `B` follows `|sin(2 * row)|` in degrees.
    XSine,
    /// `B` follows `|sin(2 * column)|` in degrees.
    YSine,
    /// Reserved; no ring modification.
    XRamp,
    /// Reserved; no ring modification.
    YRamp,
}

impl BoundaryCondition {
    /// Every selectable policy, in declaration order.
    pub const ALL: [BoundaryCondition; 8] = [
        Self::None,
        Self::Uniform,
        Self::XGradient,
        Self::YGradient,
        Self::XSine,
        Self::YSine,
        Self::XRamp,
        Self::YRamp,
    ];

    /// Whether applying this policy writes anything to the ring.
    pub fn modifies_ring(self) -> bool {
        !matches!(self, Self::None | Self::XRamp | Self::YRamp)
    }

    /// Compact encoding used for lock-free sharing across threads.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Uniform => 1,
            Self::XGradient => 2,
            Self::YGradient => 3,
            Self::XSine => 4,
            Self::YSine => 5,
            Self::XRamp => 6,
            Self::YRamp => 7,
        }
    }

    /// Decode a value produced by [`to_u8`](Self::to_u8).
    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Uniform => "uniform",
            Self::XGradient => "x-gradient",
            Self::YGradient => "y-gradient",
            Self::XSine => "x-sine",
            Self::YSine => "y-sine",
            Self::XRamp => "x-ramp",
            Self::YRamp => "y-ramp",
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryCondition {
    type Err = ParseBoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|bc| bc.name().replace('-', "") == normalized)
            .ok_or_else(|| ParseBoundaryError {
                input: s.to_string(),
            })
    }
}
