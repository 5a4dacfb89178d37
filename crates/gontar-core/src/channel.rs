//! Reactant channels and the injection payload.

use std::fmt;

/// One of the three reactant species tracked per cell.
///
/// The discriminant doubles as the channel's plane index in grid storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Species A.
    A = 0,
    /// Species B.
    B = 1,
    /// Species C.
    C = 2,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::A, Channel::B, Channel::C];

    /// Plane index of this channel within a grid.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(name)
    }
}

/// Concentrations written by an injection, one per channel.
///
/// Values are written verbatim: injection deliberately bypasses the
/// kinetic clamps so a host can drive the field anywhere it likes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Injection {
    /// Concentration of species A.
    pub a: f64,
    /// Concentration of species B.
    pub b: f64,
    /// Concentration of species C.
    pub c: f64,
}

impl Injection {
    /// Build an injection from its three concentrations.
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// The concentrations as a `[A, B, C]` array.
    pub fn as_array(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }
}

impl From<[f64; 3]> for Injection {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}
