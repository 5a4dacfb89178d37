//! The lock-guarded current grid.
//!
//! [`SharedGrid`] is the one piece of grid state touched from more than one
//! thread: the stepping thread snapshots it, applies boundary policies to
//! it, and transfers each finished step into it, while any number of
//! handles may inject into it concurrently. Every access goes through a
//! single `Mutex`, held only for bounded work (a 3x3 write, a ring pass,
//! or a bulk copy of `3 * width * height` values).
//!
//! Injections that land while a step is in flight are also queued for
//! replay after that step's transfer. The queue holds at most one entry
//! per block centre, so it never grows past the number of interior cells
//! no matter how often a handle injects during one step.

use std::sync::{Mutex, MutexGuard};

use gontar_core::Injection;
use indexmap::IndexMap;

use crate::grid::ConcentrationGrid;

/// Injections recorded while a step was in flight, keyed by block centre.
///
/// Entries are ordered by each centre's latest write. Replaying them in
/// that order reproduces the grid the raw injection sequence would have
/// left, since every cell ends up with the value of the latest block that
/// covers it.
#[derive(Debug, Default)]
pub(crate) struct PendingInjections {
    blocks: IndexMap<(usize, usize), Injection>,
}

impl PendingInjections {
    /// Record `values` at centre `(x, y)`, superseding any earlier entry
    /// for the same centre.
    pub fn record(&mut self, x: usize, y: usize, values: Injection) {
        // Moving the key to the end keeps the order of latest writes.
        self.blocks.shift_remove(&(x, y));
        self.blocks.insert((x, y), values);
    }

    /// Number of distinct centres waiting for replay.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Write every recorded block into `grid` and empty the queue.
    /// Returns the number of blocks written.
    pub fn replay_into(&mut self, grid: &mut ConcentrationGrid) -> usize {
        let replayed = self.blocks.len();
        for ((x, y), values) in self.blocks.drain(..) {
            write_block(grid, x, y, values);
        }
        replayed
    }
}

pub(crate) struct GridState {
    pub grid: ConcentrationGrid,
    pub step_in_flight: bool,
    pub pending: PendingInjections,
}

/// Where an injection landed after coordinate clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectionReceipt {
    /// Clamped centre column.
    pub x: usize,
    /// Clamped centre row.
    pub y: usize,
    /// Whether a step was in flight, so the injection will be replayed
    /// after that step's transfer.
    pub deferred_replay: bool,
}

/// The current concentration grid behind its mutual-exclusion lock.
pub struct SharedGrid {
    state: Mutex<GridState>,
}

// Compile-time assertion: SharedGrid must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SharedGrid>();
};

impl SharedGrid {
    /// Wrap `grid` as the current grid.
    pub fn new(grid: ConcentrationGrid) -> Self {
        Self {
            state: Mutex::new(GridState {
                grid,
                step_in_flight: false,
                pending: PendingInjections::default(),
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, GridState> {
        // Grid contents are plain numbers; a panic elsewhere cannot leave
        // them structurally invalid, so poisoning is ignored.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        self.lock().grid.dims()
    }

    /// Run `f` with read access to the current grid, under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&ConcentrationGrid) -> R) -> R {
        f(&self.lock().grid)
    }

    /// Run `f` with write access to the current grid, under the lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut ConcentrationGrid) -> R) -> R {
        f(&mut self.lock().grid)
    }

    /// Clone the current grid.
    pub fn to_grid(&self) -> ConcentrationGrid {
        self.lock().grid.clone()
    }

    /// Write `values` into the 3x3 block centred on `(x, y)`.
    ///
    /// The centre is first clamped into `[1, width - 2] x [1, height - 2]`
    /// so the whole block lies on the grid. The write is immediate and is
    /// seen by the next step that snapshots the grid. If a step is in
    /// flight, the block is also rewritten after that step's transfer and
    /// so appears in that step's frame.
    pub fn inject(&self, x: i64, y: i64, values: Injection) -> InjectionReceipt {
        let mut state = self.lock();
        let (cx, cy) = clamp_centre(x, y, state.grid.dims());
        write_block(&mut state.grid, cx, cy, values);
        let deferred_replay = state.step_in_flight;
        if deferred_replay {
            state.pending.record(cx, cy, values);
        }
        InjectionReceipt {
            x: cx,
            y: cy,
            deferred_replay,
        }
    }
}

impl std::fmt::Debug for SharedGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dims();
        f.debug_struct("SharedGrid")
            .field("width", &w)
            .field("height", &h)
            .finish()
    }
}

/// Clamp an injection centre so its 3x3 block stays on a `dims` grid.
pub(crate) fn clamp_centre(x: i64, y: i64, dims: (usize, usize)) -> (usize, usize) {
    let (w, h) = dims;
    let cx = x.clamp(1, w as i64 - 2) as usize;
    let cy = y.clamp(1, h as i64 - 2) as usize;
    (cx, cy)
}

pub(crate) fn write_block(grid: &mut ConcentrationGrid, cx: usize, cy: usize, values: Injection) {
    let cell = values.as_array();
    for y in cy - 1..=cy + 1 {
        for x in cx - 1..=cx + 1 {
            grid.set_cell(x, y, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_injection_is_clamped_inward() {
        let shared = SharedGrid::new(ConcentrationGrid::new(10, 10));
        let receipt = shared.inject(0, 0, Injection::new(0.3, 0.3, 0.4));
        assert_eq!((receipt.x, receipt.y), (1, 1));
        assert!(!receipt.deferred_replay);
        shared.read(|g| {
            for y in 0..3 {
                for x in 0..3 {
                    assert_eq!(g.cell(x, y), [0.3, 0.3, 0.4]);
                }
            }
            assert_eq!(g.cell(3, 3), gontar_core::INITIAL_CONCENTRATIONS);
        });
    }

    #[test]
    fn far_injection_is_clamped_to_last_interior_cell() {
        let shared = SharedGrid::new(ConcentrationGrid::new(10, 6));
        let receipt = shared.inject(500, -7, Injection::new(1.0, 0.0, 0.0));
        assert_eq!((receipt.x, receipt.y), (8, 1));
        shared.read(|g| assert_eq!(g.cell(9, 2), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn smallest_grid_has_one_centre() {
        assert_eq!(clamp_centre(-3, 99, (3, 3)), (1, 1));
    }

    #[test]
    fn injection_during_step_is_queued() {
        let shared = SharedGrid::new(ConcentrationGrid::new(5, 5));
        shared.lock().step_in_flight = true;
        let receipt = shared.inject(2, 2, Injection::new(0.5, 0.5, 0.0));
        assert!(receipt.deferred_replay);
        assert_eq!(shared.lock().pending.len(), 1);
    }

    #[test]
    fn repeated_injections_at_one_centre_queue_once() {
        let shared = SharedGrid::new(ConcentrationGrid::new(6, 6));
        shared.lock().step_in_flight = true;
        for k in 0..10_000 {
            shared.inject(2, 2, Injection::new(k as f64 / 10_000.0, 0.0, 0.0));
        }
        // Clamping folds far-away requests onto the same centre too.
        for _ in 0..1_000 {
            shared.inject(-40, -40, Injection::new(0.0, 1.0, 0.0));
        }
        let mut state = shared.lock();
        assert_eq!(state.pending.len(), 2);
        let mut grid = ConcentrationGrid::new(6, 6);
        assert_eq!(state.pending.replay_into(&mut grid), 2);
        assert_eq!(state.pending.len(), 0);
        assert_eq!(grid.cell(3, 3), [0.9999, 0.0, 0.0]);
        assert_eq!(grid.cell(0, 0), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn replay_order_follows_latest_write_per_centre() {
        // (1,1) and (2,2) overlap on cells (1..=2, 1..=2).
        let mut pending = PendingInjections::default();
        pending.record(1, 1, Injection::new(0.1, 0.0, 0.0));
        pending.record(2, 2, Injection::new(0.2, 0.0, 0.0));
        pending.record(1, 1, Injection::new(0.3, 0.0, 0.0));

        let mut replayed = ConcentrationGrid::new(6, 6);
        pending.replay_into(&mut replayed);

        let mut direct = ConcentrationGrid::new(6, 6);
        write_block(&mut direct, 1, 1, Injection::new(0.1, 0.0, 0.0));
        write_block(&mut direct, 2, 2, Injection::new(0.2, 0.0, 0.0));
        write_block(&mut direct, 1, 1, Injection::new(0.3, 0.0, 0.0));

        assert_eq!(replayed, direct);
        assert_eq!(replayed.cell(2, 2), [0.3, 0.0, 0.0]);
    }
}
