//! The iteration counter.

use std::fmt;

/// Monotonically increasing step counter.
///
/// Starts at zero when a vessel is built and is incremented exactly once
/// per completed step. Resizing a vessel does not reset it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iteration(pub u64);

impl Iteration {
    /// The iteration that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Iteration {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
