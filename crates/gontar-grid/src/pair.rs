//! Double-buffered current/next grids.
//!
//! [`BufferPair`] owns the private **next** grid and a **scratch** copy of
//! current, and shares the lock-guarded current grid with any handles. The
//! lifecycle per step is:
//!
//! 1. `begin_step()`: under the lock, copy current into scratch and mark a
//!    step in flight; then copy scratch's ring into next. Returns a
//!    [`StepGuard`] reading scratch and writing next.
//! 2. The caller computes every interior cell of next.
//! 3. `publish(iteration)`: under the lock, bulk-copy next into current,
//!    replay any injections that arrived mid-step, capture current as the
//!    step's [`Frame`], and clear the in-flight mark.
//!
//! ```text
//!              lock                       lock
//! current ──copy──> scratch ──kinetics──> next ──copy──> current ──> frame
//!                                               + replay pending
//! ```

use std::sync::Arc;

use gontar_core::Iteration;

use crate::frame::Frame;
use crate::grid::ConcentrationGrid;
use crate::shared::SharedGrid;

/// Read/write access for one step.
///
/// Created by [`BufferPair::begin_step()`] and dropped before
/// [`BufferPair::publish()`].
#[must_use]
pub struct StepGuard<'a> {
    /// Consistent copy of the current grid taken at step start.
    pub current: &'a ConcentrationGrid,
    /// Next grid; its ring already mirrors `current`.
    pub next: &'a mut ConcentrationGrid,
}

/// Outcome of a transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishReport {
    /// Distinct injection blocks that arrived during the step and were
    /// re-applied. Repeated injections at one centre count once.
    pub replayed_injections: usize,
    /// The current grid as it stood when the transfer finished, replayed
    /// injections included.
    pub frame: Frame,
}

/// The current/next grid pair.
pub struct BufferPair {
    current: Arc<SharedGrid>,
    next: ConcentrationGrid,
    scratch: ConcentrationGrid,
    step_in_progress: bool,
}

impl BufferPair {
    /// Allocate a pair from an initial current grid. Next and scratch
    /// start as copies of it.
    pub fn new(initial: ConcentrationGrid) -> Self {
        Self {
            next: initial.clone(),
            scratch: initial.clone(),
            current: Arc::new(SharedGrid::new(initial)),
            step_in_progress: false,
        }
    }

    /// The shared, lock-guarded current grid.
    pub fn current(&self) -> &Arc<SharedGrid> {
        &self.current
    }

    /// The next grid as of the last publish (equal to current minus any
    /// injections made since).
    pub fn next(&self) -> &ConcentrationGrid {
        &self.next
    }

    /// `(width, height)` of all three grids.
    pub fn dims(&self) -> (usize, usize) {
        self.next.dims()
    }

    /// Snapshot current and open a step.
    pub fn begin_step(&mut self) -> StepGuard<'_> {
        {
            let mut state = self.current.lock();
            self.scratch.copy_from(&state.grid);
            state.pending.clear();
            state.step_in_flight = true;
        }
        self.step_in_progress = true;
        self.next.copy_ring_from(&self.scratch);
        StepGuard {
            current: &self.scratch,
            next: &mut self.next,
        }
    }

    /// Transfer next into current, close the step, and capture current
    /// as the frame for `iteration`.
    ///
    /// The capture happens under the same lock as the transfer, so the
    /// frame holds exactly what current held when the step ended.
    pub fn publish(&mut self, iteration: Iteration) -> PublishReport {
        debug_assert!(
            self.step_in_progress,
            "publish() called without a preceding begin_step()"
        );
        let mut state = self.current.lock();
        let state = &mut *state;
        state.grid.copy_from(&self.next);
        let replayed_injections = state.pending.replay_into(&mut state.grid);
        state.step_in_flight = false;
        self.step_in_progress = false;
        PublishReport {
            replayed_injections,
            frame: Frame::capture(iteration, &state.grid),
        }
    }

    /// Replace all three grids with `grid`, atomically from the point of
    /// view of handles: the current grid is swapped in one locked write,
    /// so no handle ever observes a partially resized state.
    pub fn replace(&mut self, grid: ConcentrationGrid) {
        self.next = grid.clone();
        self.scratch = grid.clone();
        let mut state = self.current.lock();
        state.grid = grid;
        state.pending.clear();
        state.step_in_flight = false;
        self.step_in_progress = false;
    }
}

impl std::fmt::Debug for BufferPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPair")
            .field("dims", &self.dims())
            .field("step_in_progress", &self.step_in_progress)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gontar_core::{Channel, Injection};

    #[test]
    fn begin_step_mirrors_ring_into_next() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(6, 5));
        pair.current().write(|g| g.set_cell(0, 2, [0.9, 0.05, 0.05]));
        let guard = pair.begin_step();
        assert_eq!(guard.current.cell(0, 2), [0.9, 0.05, 0.05]);
        assert_eq!(guard.next.cell(0, 2), [0.9, 0.05, 0.05]);
        let _ = pair.publish(Iteration(1));
    }

    #[test]
    fn publish_transfers_next_into_current() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(5, 5));
        let guard = pair.begin_step();
        guard.next.set(Channel::A, 2, 2, 0.42);
        let report = pair.publish(Iteration(1));
        assert_eq!(report.replayed_injections, 0);
        assert_eq!(pair.current().read(|g| g.get(Channel::A, 2, 2)), 0.42);
        assert_eq!(report.frame.iteration(), Iteration(1));
        assert_eq!(report.frame.get(Channel::A, 2, 2), 0.42);
    }

    #[test]
    fn injection_during_step_survives_publish() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(7, 7));
        let shared = Arc::clone(pair.current());
        let guard = pair.begin_step();
        guard.next.set(Channel::C, 3, 3, 0.01);
        let receipt = shared.inject(3, 3, Injection::new(0.2, 0.3, 0.5));
        assert!(receipt.deferred_replay);
        let report = pair.publish(Iteration(1));
        assert_eq!(report.replayed_injections, 1);
        shared.read(|g| assert_eq!(g.cell(3, 3), [0.2, 0.3, 0.5]));
        // The next grid keeps the computed value; only current carries the replay.
        assert_eq!(pair.next().get(Channel::C, 3, 3), 0.01);
    }

    #[test]
    fn frame_shows_injections_replayed_by_its_step() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(7, 7));
        let shared = Arc::clone(pair.current());
        let guard = pair.begin_step();
        for y in 1..6 {
            for x in 1..6 {
                guard.next.set_cell(x, y, [0.5, 0.25, 0.25]);
            }
        }
        shared.inject(4, 4, Injection::new(0.7, 0.2, 0.1));
        let report = pair.publish(Iteration(3));
        let frame = report.frame;
        assert_eq!(frame.iteration(), Iteration(3));
        for y in 3..=5 {
            for x in 3..=5 {
                assert_eq!(frame.cell(x, y), [0.7, 0.2, 0.1], "({x}, {y})");
            }
        }
        assert_eq!(frame.cell(2, 2), [0.5, 0.25, 0.25]);
        assert_eq!(&frame, &shared.read(|g| Frame::capture(Iteration(3), g)));
    }

    #[test]
    fn injection_flood_during_step_replays_one_block() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(9, 9));
        let shared = Arc::clone(pair.current());
        let _guard = pair.begin_step();
        for k in 0..5_000 {
            let receipt = shared.inject(4, 4, Injection::new(0.0, k as f64 / 5_000.0, 0.0));
            assert!(receipt.deferred_replay);
        }
        let report = pair.publish(Iteration(1));
        assert_eq!(report.replayed_injections, 1);
        assert_eq!(report.frame.cell(4, 4), [0.0, 4_999.0 / 5_000.0, 0.0]);
    }

    #[test]
    fn injection_between_steps_is_not_replayed() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(5, 5));
        let receipt = pair.current().inject(2, 2, Injection::new(0.1, 0.1, 0.8));
        assert!(!receipt.deferred_replay);
        let guard = pair.begin_step();
        assert_eq!(guard.current.cell(2, 2), [0.1, 0.1, 0.8]);
        assert_eq!(pair.publish(Iteration(1)).replayed_injections, 0);
    }

    #[test]
    fn replace_swaps_shape_everywhere() {
        let mut pair = BufferPair::new(ConcentrationGrid::new(5, 5));
        let shared = Arc::clone(pair.current());
        pair.replace(ConcentrationGrid::new(8, 4));
        assert_eq!(pair.dims(), (8, 4));
        assert_eq!(shared.dims(), (8, 4));
        let guard = pair.begin_step();
        assert_eq!(guard.current.dims(), (8, 4));
        let _ = pair.publish(Iteration(1));
    }
}
