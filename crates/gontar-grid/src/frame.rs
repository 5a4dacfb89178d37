//! Owned, immutable step results.

use gontar_core::{Channel, Iteration};

use crate::grid::ConcentrationGrid;

/// Summary statistics of one channel over a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelStats {
    /// Smallest concentration.
    pub min: f64,
    /// Largest concentration.
    pub max: f64,
    /// Arithmetic mean concentration.
    pub mean: f64,
}

/// A completed step: a copy of the grid plus the iteration it belongs to.
///
/// Frames are handed to consumers as `Arc<Frame>`. They own their data, so a
/// consumer may keep one for as long as it likes while the simulation moves
/// on; nothing in the engine ever writes to a published frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    iteration: Iteration,
    grid: ConcentrationGrid,
}

// Compile-time assertion: Frame must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Frame>();
};

impl Frame {
    /// Capture `grid` as the frame for `iteration`.
    pub fn capture(iteration: Iteration, grid: &ConcentrationGrid) -> Self {
        Self {
            iteration,
            grid: grid.clone(),
        }
    }

    /// The iteration this frame completes.
    pub fn iteration(&self) -> Iteration {
        self.iteration
    }

    /// Frame width.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Frame height.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Concentration of `channel` at `(x, y)`.
    pub fn get(&self, channel: Channel, x: usize, y: usize) -> f64 {
        self.grid.get(channel, x, y)
    }

    /// `[A, B, C]` at `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> [f64; 3] {
        self.grid.cell(x, y)
    }

    /// One channel's row-major plane.
    pub fn plane(&self, channel: Channel) -> &[f64] {
        self.grid.plane(channel)
    }

    /// The captured grid.
    pub fn grid(&self) -> &ConcentrationGrid {
        &self.grid
    }

    /// Min, max, and mean of one channel.
    pub fn stats(&self, channel: Channel) -> ChannelStats {
        let plane = self.plane(channel);
        let (min, max, sum) = plane.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v),
        );
        ChannelStats {
            min,
            max,
            mean: sum / plane.len() as f64,
        }
    }
}
