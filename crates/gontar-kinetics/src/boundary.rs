//! Boundary policies for the grid's outer ring.
//!
//! `i` is the column index and `j` the row index of a ring cell. Note that
//! `XGradient`/`XSine` vary with the row `j` and `YGradient`/`YSine` with
//! the column `i`, not with the axis in their names.

use std::f64::consts::PI;

use gontar_core::{BoundaryCondition, INITIAL_CONCENTRATIONS, MIN_CONCENTRATION};
use gontar_grid::ConcentrationGrid;

/// `[A, B, C]` that `policy` assigns to ring cell `(i, j)` of a
/// `height`-row grid, or `None` if the policy leaves the ring alone.
///
/// Both gradients divide by `height`, including `YGradient`, whose index
/// runs along the width. On grids wider than tall, its `A` can exceed 1
/// and `B` go negative near the right edge.
pub fn ring_values(
    policy: BoundaryCondition,
    i: usize,
    j: usize,
    height: usize,
) -> Option<[f64; 3]> {
    match policy {
        BoundaryCondition::Uniform => Some(INITIAL_CONCENTRATIONS),
        BoundaryCondition::XGradient => Some(gradient(j, height)),
        BoundaryCondition::YGradient => Some(gradient(i, height)),
        BoundaryCondition::XSine => Some(sine(j)),
        BoundaryCondition::YSine => Some(sine(i)),
        BoundaryCondition::XRamp | BoundaryCondition::YRamp | BoundaryCondition::None => None,
    }
}

fn gradient(index: usize, height: usize) -> [f64; 3] {
    let a = index as f64 / height as f64;
    [a, 1.0 - a, MIN_CONCENTRATION]
}

fn sine(angle_deg: usize) -> [f64; 3] {
    let d = (2.0 * angle_deg as f64 * PI / 180.0).sin().abs();
    [1.0 - d, d, MIN_CONCENTRATION]
}

/// Apply `policy` to every ring cell of `grid`. Returns the number of
/// cells written (zero for the no-op policies).
pub fn apply_boundary(grid: &mut ConcentrationGrid, policy: BoundaryCondition) -> usize {
    if !policy.modifies_ring() {
        return 0;
    }
    let height = grid.height();
    let cells: Vec<(usize, usize)> = grid.ring_cells().collect();
    let mut written = 0;
    for (i, j) in cells {
        if let Some(values) = ring_values(policy, i, j, height) {
            grid.set_cell(i, j, values);
            written += 1;
        }
    }
    written
}
