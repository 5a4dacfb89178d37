//! Three-channel concentration field.

use gontar_core::{Channel, INITIAL_CONCENTRATIONS};

/// A `width x height` field holding one concentration per channel per cell.
///
/// Each channel is a separate contiguous plane in row-major order, so a
/// cell `(x, y)` lives at index `y * width + x` in every plane. `x` is the
/// column, `y` the row.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcentrationGrid {
    width: usize,
    height: usize,
    planes: [Vec<f64>; 3],
}

impl ConcentrationGrid {
    /// Allocate a grid with every cell set to the initial uniform
    /// concentrations.
    ///
    /// Dimensions are not validated here; callers check them against the
    /// configured limits first.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, INITIAL_CONCENTRATIONS)
    }

    /// Allocate a grid with every cell set to `values` (`[A, B, C]`).
    pub fn filled(width: usize, height: usize, values: [f64; 3]) -> Self {
        let n = width * height;
        Self {
            width,
            height,
            planes: values.map(|v| vec![v; n]),
        }
    }

    /// Grid width (number of columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (number of rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells per channel.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Flat index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    /// Concentration of `channel` at `(x, y)`.
    #[inline]
    pub fn get(&self, channel: Channel, x: usize, y: usize) -> f64 {
        self.planes[channel.index()][self.index(x, y)]
    }

    /// Set the concentration of `channel` at `(x, y)`.
    #[inline]
    pub fn set(&mut self, channel: Channel, x: usize, y: usize, value: f64) {
        let i = self.index(x, y);
        self.planes[channel.index()][i] = value;
    }

    /// All three concentrations at `(x, y)` as `[A, B, C]`.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> [f64; 3] {
        let i = self.index(x, y);
        [self.planes[0][i], self.planes[1][i], self.planes[2][i]]
    }

    /// Set all three concentrations at `(x, y)`.
    #[inline]
    pub fn set_cell(&mut self, x: usize, y: usize, values: [f64; 3]) {
        let i = self.index(x, y);
        for (plane, v) in self.planes.iter_mut().zip(values) {
            plane[i] = v;
        }
    }

    /// Read-only view of one channel's plane.
    pub fn plane(&self, channel: Channel) -> &[f64] {
        &self.planes[channel.index()]
    }

    /// Mutable view of one channel's plane.
    pub fn plane_mut(&mut self, channel: Channel) -> &mut [f64] {
        &mut self.planes[channel.index()]
    }

    /// Set every cell to `values`.
    pub fn fill(&mut self, values: [f64; 3]) {
        for (plane, v) in self.planes.iter_mut().zip(values) {
            plane.fill(v);
        }
    }

    /// Whether `(x, y)` lies on the outer ring.
    #[inline]
    pub fn is_ring(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    /// Every ring cell, each exactly once: top and bottom rows in full,
    /// then the left and right columns without their corners.
    pub fn ring_cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (w, h) = (self.width, self.height);
        let rows = (0..w).flat_map(move |x| [(x, 0), (x, h - 1)]);
        let cols = (1..h - 1).flat_map(move |y| [(0, y), (w - 1, y)]);
        rows.chain(cols)
    }

    /// Copy every cell of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the two grids differ in shape.
    pub fn copy_from(&mut self, other: &ConcentrationGrid) {
        assert_eq!(
            self.dims(),
            other.dims(),
            "grid shapes must match for a bulk copy"
        );
        for (dst, src) in self.planes.iter_mut().zip(&other.planes) {
            dst.copy_from_slice(src);
        }
    }

    /// Copy only the ring cells of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the two grids differ in shape.
    pub fn copy_ring_from(&mut self, other: &ConcentrationGrid) {
        assert_eq!(
            self.dims(),
            other.dims(),
            "grid shapes must match for a ring copy"
        );
        let w = self.width;
        let last = (self.height - 1) * w;
        for (dst, src) in self.planes.iter_mut().zip(&other.planes) {
            dst[..w].copy_from_slice(&src[..w]);
            dst[last..].copy_from_slice(&src[last..]);
            for y in 1..self.height - 1 {
                let row = y * w;
                dst[row] = src[row];
                dst[row + w - 1] = src[row + w - 1];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn new_grid_holds_initial_values() {
        let g = ConcentrationGrid::new(4, 3);
        assert_eq!(g.dims(), (4, 3));
        assert_eq!(g.cell_count(), 12);
        assert_eq!(g.cell(2, 1), INITIAL_CONCENTRATIONS);
        assert_eq!(g.plane(Channel::C).len(), 12);
    }

    #[test]
    fn set_and_get_are_row_major() {
        let mut g = ConcentrationGrid::filled(5, 4, [0.0; 3]);
        g.set(Channel::B, 3, 2, 0.75);
        assert_eq!(g.plane(Channel::B)[2 * 5 + 3], 0.75);
        assert_eq!(g.get(Channel::B, 3, 2), 0.75);
        assert_eq!(g.get(Channel::A, 3, 2), 0.0);
    }

    #[test]
    fn ring_copy_leaves_interior_untouched() {
        let src = ConcentrationGrid::filled(5, 5, [1.0, 2.0, 3.0]);
        let mut dst = ConcentrationGrid::filled(5, 5, [0.0; 3]);
        dst.copy_ring_from(&src);
        for y in 0..5 {
            for x in 0..5 {
                let expected = if dst.is_ring(x, y) {
                    [1.0, 2.0, 3.0]
                } else {
                    [0.0; 3]
                };
                assert_eq!(dst.cell(x, y), expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    #[should_panic(expected = "shapes must match")]
    fn copy_between_shapes_panics() {
        let src = ConcentrationGrid::new(4, 4);
        let mut dst = ConcentrationGrid::new(5, 4);
        dst.copy_from(&src);
    }

    // ── Property tests ──────────────────────────────────────────

    proptest! {
        #[test]
        fn ring_cells_visit_each_ring_cell_once(w in 3usize..20, h in 3usize..20) {
            let g = ConcentrationGrid::new(w, h);
            let cells: Vec<_> = g.ring_cells().collect();
            let unique: HashSet<_> = cells.iter().copied().collect();
            prop_assert_eq!(cells.len(), unique.len());
            prop_assert_eq!(cells.len(), 2 * w + 2 * (h - 2));
            prop_assert!(cells.iter().all(|&(x, y)| g.is_ring(x, y)));
        }
    }
}
