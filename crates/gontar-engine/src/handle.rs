//! Thread-safe access to a running vessel.
//!
//! A [`VesselHandle`] shares the vessel's current grid and control state.
//! Every method is safe to call from any thread while the vessel steps on
//! another: injections take the grid lock for a 3x3 write, parameter and
//! boundary changes are picked up at the start of the next step, and frame
//! subscriptions start with the next notification.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use gontar_core::{
    BoundaryCondition, Coefficient, Injection, Iteration, KineticParams, Limits, ValidationError,
};
use gontar_grid::{ConcentrationGrid, Frame, InjectionReceipt, SharedGrid};

use crate::metrics::Diagnostics;
use crate::observer::{Delivery, ObserverId, ObserverList};

/// Control state shared by a vessel and all of its handles.
pub(crate) struct Controls {
    pub limits: Limits,
    params: Mutex<KineticParams>,
    boundary: AtomicU8,
    observers: Mutex<ObserverList>,
    latest: Mutex<Option<Arc<Frame>>>,
    iteration: AtomicU64,
    singular_cells: AtomicU64,
    steps_with_singularities: AtomicU64,
    injections: AtomicU64,
    replayed_injections: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Controls {
    pub fn new(limits: Limits, params: KineticParams, boundary: BoundaryCondition) -> Self {
        Self {
            limits,
            params: Mutex::new(params),
            boundary: AtomicU8::new(boundary.to_u8()),
            observers: Mutex::new(ObserverList::default()),
            latest: Mutex::new(None),
            iteration: AtomicU64::new(0),
            singular_cells: AtomicU64::new(0),
            steps_with_singularities: AtomicU64::new(0),
            injections: AtomicU64::new(0),
            replayed_injections: AtomicU64::new(0),
        }
    }

    /// Record a finished step and deliver its frame.
    ///
    /// The observer lock is held while callbacks run, so callbacks must not
    /// subscribe or unsubscribe through a handle of the same vessel.
    pub fn publish(&self, frame: &Arc<Frame>, skipped: usize, replayed: usize) {
        self.iteration.store(frame.iteration().0, Ordering::Release);
        if skipped > 0 {
            self.singular_cells
                .fetch_add(skipped as u64, Ordering::Relaxed);
            self.steps_with_singularities
                .fetch_add(1, Ordering::Relaxed);
        }
        if replayed > 0 {
            self.replayed_injections
                .fetch_add(replayed as u64, Ordering::Relaxed);
        }
        *lock(&self.latest) = Some(Arc::clone(frame));
        lock(&self.observers).notify(frame);
    }
}

/// Cloneable, `Send + Sync` handle onto a [`Vessel`](crate::Vessel).
///
/// Obtained from [`Vessel::handle`](crate::Vessel::handle) or
/// [`Simulation::handle`](crate::Simulation::handle). Handles stay valid
/// across resizes and across start/stop of a simulation.
#[derive(Clone)]
pub struct VesselHandle {
    grid: Arc<SharedGrid>,
    controls: Arc<Controls>,
}

// Compile-time assertion: VesselHandle must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<VesselHandle>();
};

impl VesselHandle {
    pub(crate) fn new(grid: Arc<SharedGrid>, controls: Arc<Controls>) -> Self {
        Self { grid, controls }
    }

    pub(crate) fn controls(&self) -> &Controls {
        &self.controls
    }

    // ── Grid ─────────────────────────────────────────────────────

    /// Current `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        self.grid.dims()
    }

    /// Write `injection` into the 3x3 block centred on `(x, y)` of the
    /// current grid, immediately.
    ///
    /// The centre is clamped so the block stays on the grid. If a step is
    /// in flight the injection is also replayed after that step's
    /// transfer, so the next step always sees it.
    pub fn inject(&self, x: i64, y: i64, injection: Injection) -> InjectionReceipt {
        let receipt = self.grid.inject(x, y, injection);
        self.controls.injections.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "injected {:?} at ({}, {}){}",
            injection,
            receipt.x,
            receipt.y,
            if receipt.deferred_replay {
                " during a step"
            } else {
                ""
            }
        );
        receipt
    }

    /// Run `f` on the current grid under its lock.
    pub fn read_current<R>(&self, f: impl FnOnce(&ConcentrationGrid) -> R) -> R {
        self.grid.read(f)
    }

    // ── Boundary ─────────────────────────────────────────────────

    /// Select the boundary policy applied at the start of the next step.
    ///
    /// Selecting the policy already in effect changes nothing.
    pub fn set_boundary_condition(&self, policy: BoundaryCondition) {
        self.controls
            .boundary
            .store(policy.to_u8(), Ordering::Release);
    }

    /// The selected boundary policy.
    pub fn boundary_condition(&self) -> BoundaryCondition {
        let raw = self.controls.boundary.load(Ordering::Acquire);
        // Only `to_u8` values are ever stored.
        BoundaryCondition::from_u8(raw).unwrap_or_default()
    }

    // ── Parameters ───────────────────────────────────────────────

    /// The limits every write is checked against.
    pub fn limits(&self) -> &Limits {
        &self.controls.limits
    }

    /// The coefficients the next step will use.
    pub fn params(&self) -> KineticParams {
        *lock(&self.controls.params)
    }

    /// Read one coefficient.
    pub fn parameter(&self, coefficient: Coefficient) -> f64 {
        self.params().get(coefficient)
    }

    /// Set one coefficient. Out-of-range values are rejected and the
    /// previous value is kept. Dimensions change through
    /// [`Vessel::resize`](crate::Vessel::resize).
    pub fn set_parameter(
        &self,
        coefficient: Coefficient,
        value: f64,
    ) -> Result<(), ValidationError> {
        let value = self
            .controls
            .limits
            .check(coefficient, value)
            .inspect_err(|e| log::warn!("rejected parameter write: {e}"))?;
        let mut params = lock(&self.controls.params);
        *params = params.with(coefficient, value);
        Ok(())
    }

    /// Replace all coefficients at once. Either every value is accepted or
    /// none is.
    pub fn set_params(&self, params: KineticParams) -> Result<(), ValidationError> {
        params
            .validate(&self.controls.limits)
            .inspect_err(|e| log::warn!("rejected parameter write: {e}"))?;
        *lock(&self.controls.params) = params;
        Ok(())
    }

    // ── Frames ───────────────────────────────────────────────────

    /// Register `callback` to receive every subsequent frame.
    ///
    /// The callback runs on the stepping thread at the end of each step and
    /// must not subscribe or unsubscribe through this vessel.
    pub fn subscribe(&self, mut callback: impl FnMut(&Arc<Frame>) + Send + 'static) -> ObserverId {
        self.subscribe_until(move |frame| {
            callback(frame);
            Delivery::Continue
        })
    }

    /// Register a callback that decides after each frame whether to keep
    /// receiving.
    pub fn subscribe_until(
        &self,
        callback: impl FnMut(&Arc<Frame>) -> Delivery + Send + 'static,
    ) -> ObserverId {
        lock(&self.controls.observers).insert(Box::new(callback))
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        lock(&self.controls.observers).remove(id)
    }

    /// Receive every subsequent frame over an unbounded channel.
    ///
    /// Sending never blocks the stepping thread and never drops a frame.
    /// Dropping the receiver unsubscribes on the next step.
    pub fn frame_channel(&self) -> crossbeam_channel::Receiver<Arc<Frame>> {
        lock(&self.controls.observers).channel().1
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.controls.observers).len()
    }

    /// The most recently published frame, if any step has completed.
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        lock(&self.controls.latest).clone()
    }

    // ── Diagnostics ──────────────────────────────────────────────

    /// Last completed iteration (lock-free read).
    pub fn iteration(&self) -> Iteration {
        Iteration(self.controls.iteration.load(Ordering::Acquire))
    }

    /// Cumulative counters.
    pub fn diagnostics(&self) -> Diagnostics {
        let c = &self.controls;
        Diagnostics {
            iteration: self.iteration(),
            singular_cells: c.singular_cells.load(Ordering::Relaxed),
            steps_with_singularities: c.steps_with_singularities.load(Ordering::Relaxed),
            injections: c.injections.load(Ordering::Relaxed),
            replayed_injections: c.replayed_injections.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for VesselHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VesselHandle")
            .field("dims", &self.dims())
            .field("iteration", &self.iteration())
            .field("boundary", &self.boundary_condition())
            .finish()
    }
}
