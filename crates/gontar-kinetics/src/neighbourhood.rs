//! 3x3 neighbourhood averaging.

use gontar_grid::ConcentrationGrid;

/// Mean of each channel over the nine cells `{x-1, x, x+1} x {y-1, y, y+1}`,
/// centre included. This is the model's diffusion term (the "weight").
///
/// `(x, y)` must be an interior cell.
pub fn neighbourhood_mean(grid: &ConcentrationGrid, x: usize, y: usize) -> [f64; 3] {
    debug_assert!(
        x >= 1 && y >= 1 && x + 1 < grid.width() && y + 1 < grid.height(),
        "({x}, {y}) is not an interior cell"
    );
    let w = grid.width();
    let mut sums = [0.0f64; 3];
    for (sum, channel) in sums.iter_mut().zip(gontar_core::Channel::ALL) {
        let plane = grid.plane(channel);
        for row in [y - 1, y, y + 1] {
            let start = row * w + x - 1;
            *sum += plane[start..start + 3].iter().sum::<f64>();
        }
    }
    sums.map(|s| s / 9.0)
}
