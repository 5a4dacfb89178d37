//! Reusable vessel and grid fixtures.

use gontar_core::{Injection, MIN_CONCENTRATION};
use gontar_engine::{Vessel, VesselConfig};
use gontar_grid::ConcentrationGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A vessel with default coefficients and `Uniform` ring.
///
/// # Panics
///
/// Panics if the dimensions are outside the default limits.
pub fn small_vessel(width: usize, height: usize) -> Vessel {
    Vessel::new(VesselConfig::with_dims(width, height))
        .unwrap_or_else(|e| panic!("fixture dims {width}x{height} invalid: {e}"))
}

/// Every ring cell in [`ConcentrationGrid::ring_cells`] order.
pub fn ring_snapshot(grid: &ConcentrationGrid) -> Vec<[f64; 3]> {
    grid.ring_cells().map(|(x, y)| grid.cell(x, y)).collect()
}

/// Assert that all nine cells of the block centred on `(cx, cy)` hold
/// `values` exactly.
pub fn assert_block_eq(grid: &ConcentrationGrid, cx: usize, cy: usize, values: [f64; 3]) {
    for y in cy - 1..=cy + 1 {
        for x in cx - 1..=cx + 1 {
            assert_eq!(
                grid.cell(x, y),
                values,
                "cell ({x}, {y}) of block centred on ({cx}, {cy})"
            );
        }
    }
}

/// One entry of a scattered injection pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatteredInjection {
    pub x: i64,
    pub y: i64,
    pub injection: Injection,
}

/// Deterministic injection pattern over a `dims` grid.
///
/// Coordinates may fall anywhere on the grid, including the ring, so the
/// engine's clamping is exercised. Concentrations lie in
/// `[MIN_CONCENTRATION, 1)`. The same seed always yields the same pattern.
pub fn scatter_injections(seed: u64, count: usize, dims: (usize, usize)) -> Vec<ScatteredInjection> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (w, h) = dims;
    (0..count)
        .map(|_| ScatteredInjection {
            x: rng.random_range(0..w as i64),
            y: rng.random_range(0..h as i64),
            injection: Injection::new(
                rng.random_range(MIN_CONCENTRATION..1.0),
                rng.random_range(MIN_CONCENTRATION..1.0),
                rng.random_range(MIN_CONCENTRATION..1.0),
            ),
        })
        .collect()
}
